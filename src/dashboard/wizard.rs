use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::Error;

/// Splits comma-separated identifiers, trimming and dropping empties.
#[must_use]
pub fn parse_ids(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Payload of `POST /save-user-inputs`: floor name to door ids then stair ids.
///
/// Serializes as a JSON object in floor order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInputs(Vec<(String, Vec<String>)>);

impl UserInputs {
    #[must_use]
    pub fn get(&self, floor: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(name, _)| name == floor)
            .map(|(_, ids)| ids.as_slice())
    }

    #[must_use]
    pub fn floors(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for UserInputs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (floor, ids) in &self.0 {
            map.serialize_entry(floor, ids)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default)]
struct FloorEntry {
    name: String,
    doors: String,
    stairs: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardStep {
    /// Moved on to the named floor.
    Advanced { floor: String },
    /// The last floor was confirmed.
    Finished(UserInputs),
}

/// Collects door and stair identifiers one floor at a time.
#[derive(Debug, Clone)]
pub struct FloorWizard {
    floors: Vec<FloorEntry>,
    current: usize,
}

impl FloorWizard {
    /// # Errors
    ///
    /// Returns [`Error::NoFloors`] if there is nothing to walk through.
    pub fn new(floors: Vec<String>) -> Result<Self, Error> {
        if floors.is_empty() {
            return Err(Error::NoFloors);
        }
        let floors = floors
            .into_iter()
            .map(|name| FloorEntry {
                name,
                ..FloorEntry::default()
            })
            .collect();
        Ok(Self { floors, current: 0 })
    }

    #[must_use]
    pub fn current_floor(&self) -> &str {
        &self.floors[self.current].name
    }

    /// 1-based position and total, e.g. `(1, 3)`.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.current + 1, self.floors.len())
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.floors.len()
    }

    pub fn set_doors(&mut self, text: impl Into<String>) {
        self.floors[self.current].doors = text.into();
    }

    pub fn set_stairs(&mut self, text: impl Into<String>) {
        self.floors[self.current].stairs = text.into();
    }

    /// A floor needs at least one door or stair entry before moving on.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        let entry = &self.floors[self.current];
        !entry.doors.trim().is_empty() || !entry.stairs.trim().is_empty()
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the current floor has no entries.
    pub fn next(&mut self) -> Result<WizardStep, Error> {
        if !self.can_advance() {
            return Err(Error::InvalidInput(format!(
                "enter door or stair ids for floor {}",
                self.current_floor()
            )));
        }
        if self.is_last() {
            return Ok(WizardStep::Finished(self.inputs()));
        }
        self.current += 1;
        Ok(WizardStep::Advanced {
            floor: self.current_floor().to_owned(),
        })
    }

    /// Steps back one floor; entered text is kept. Returns `false` on the first floor.
    pub fn previous(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Payload for every floor as entered so far.
    #[must_use]
    pub fn inputs(&self) -> UserInputs {
        UserInputs(
            self.floors
                .iter()
                .map(|entry| {
                    let mut ids = parse_ids(&entry.doors);
                    ids.extend(parse_ids(&entry.stairs));
                    (entry.name.clone(), ids)
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wizard(floors: &[&str]) -> FloorWizard {
        FloorWizard::new(floors.iter().map(|f| (*f).to_owned()).collect()).unwrap()
    }

    #[test]
    fn test_parse_ids_trims_and_filters() {
        assert_eq!(parse_ids("D1, D2"), vec!["D1", "D2"]);
        assert_eq!(parse_ids(" , S1,,  "), vec!["S1"]);
        assert!(parse_ids("").is_empty());
    }

    #[test]
    fn test_empty_floor_list_is_rejected() {
        assert!(matches!(FloorWizard::new(Vec::new()), Err(Error::NoFloors)));
    }

    #[test]
    fn test_two_floor_walkthrough_builds_payload() {
        let mut w = wizard(&["L1", "L2"]);
        w.set_doors("D1, D2");
        w.set_stairs("");
        assert_eq!(
            w.next().unwrap(),
            WizardStep::Advanced {
                floor: "L2".into()
            }
        );

        w.set_stairs("S9");
        let WizardStep::Finished(inputs) = w.next().unwrap() else {
            panic!("last floor should finish");
        };

        assert_eq!(
            serde_json::to_value(&inputs).unwrap(),
            serde_json::json!({ "L1": ["D1", "D2"], "L2": ["S9"] })
        );
        assert_eq!(inputs.floors().collect::<Vec<_>>(), vec!["L1", "L2"]);
    }

    #[test]
    fn test_doors_come_before_stairs() {
        let mut w = wizard(&["L1"]);
        w.set_stairs("S1");
        w.set_doors("D1");
        let inputs = w.inputs();
        assert_eq!(inputs.get("L1").unwrap(), ["D1", "S1"]);
    }

    #[test]
    fn test_cannot_advance_blank_floor() {
        let mut w = wizard(&["L1", "L2"]);
        w.set_doors("   ");
        assert!(!w.can_advance());
        assert!(matches!(w.next(), Err(Error::InvalidInput(_))));
        assert_eq!(w.current_floor(), "L1");
    }

    #[test]
    fn test_previous_keeps_entered_text() {
        let mut w = wizard(&["L1", "L2", "L3"]);
        assert!(!w.previous());
        w.set_doors("D1");
        w.next().unwrap();
        assert_eq!(w.position(), (2, 3));
        assert!(w.previous());
        assert_eq!(w.current_floor(), "L1");
        assert!(w.can_advance());
    }
}
