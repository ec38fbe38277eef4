use serde::Serialize;

use crate::decoder::PaddleState;

/// One paddle of the current match.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Paddle {
    pub name: String,
    #[serde(flatten)]
    pub state: PaddleState,
}

/// The ordered paddles of the current match.
///
/// Built once per match from the start command's controller list. Frames
/// update physics in place; size and order never change until the next
/// start.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PaddleRoster {
    paddles: Vec<Paddle>,
}

impl PaddleRoster {
    /// Roster with zeroed physics for each name, in order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paddles: names
                .into_iter()
                .map(|name| Paddle {
                    name: name.into(),
                    state: PaddleState::default(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.paddles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paddles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Paddle> {
        self.paddles.get(index)
    }

    /// Find a paddle by its controller name.
    pub fn by_name(&self, name: &str) -> Option<&Paddle> {
        self.paddles.iter().find(|paddle| paddle.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Paddle> {
        self.paddles.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.paddles.iter().map(|paddle| paddle.name.as_str())
    }

    /// Overwrite every paddle's physics, index-aligned with `states`.
    ///
    /// Returns false, changing nothing, if `states` does not hold exactly one
    /// record per paddle.
    pub fn apply(&mut self, states: &[PaddleState]) -> bool {
        if states.len() != self.paddles.len() {
            return false;
        }
        for (paddle, state) in self.paddles.iter_mut().zip(states) {
            paddle.state = *state;
        }
        true
    }
}

impl<'a> IntoIterator for &'a PaddleRoster {
    type Item = &'a Paddle;
    type IntoIter = std::slice::Iter<'a, Paddle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(position: f32) -> PaddleState {
        PaddleState {
            width: 10.0,
            height: 50.0,
            position,
            speed: 5.0,
        }
    }

    #[test]
    fn built_from_names_in_order() {
        let roster = PaddleRoster::from_names(["PLAYER 1", "PLAYER 2"]);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.names().collect::<Vec<_>>(), ["PLAYER 1", "PLAYER 2"]);
        assert_eq!(roster.get(1).unwrap().state, PaddleState::default());
    }

    #[test]
    fn apply_updates_in_roster_order() {
        let mut roster = PaddleRoster::from_names(["left", "right"]);
        assert!(roster.apply(&[state(1.0), state(2.0)]));
        assert_eq!(roster.by_name("left").unwrap().state.position, 1.0);
        assert_eq!(roster.by_name("right").unwrap().state.position, 2.0);
    }

    #[test]
    fn apply_rejects_wrong_record_count() {
        let mut roster = PaddleRoster::from_names(["only"]);
        assert!(!roster.apply(&[]));
        assert!(!roster.apply(&[state(1.0), state(2.0)]));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get(0).unwrap().state, PaddleState::default());
    }

    #[test]
    fn serializes_flat_records() {
        let mut roster = PaddleRoster::from_names(["p1"]);
        roster.apply(&[state(3.0)]);
        assert_eq!(
            serde_json::to_value(&roster).unwrap(),
            serde_json::json!([
                {"name": "p1", "width": 10.0, "height": 50.0, "position": 3.0, "speed": 5.0}
            ])
        );
    }
}
