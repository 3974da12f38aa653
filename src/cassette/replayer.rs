//! Replays recorded interactions from a cassette.

use serde_json::Value;

use super::format::{Cassette, Interaction};

/// Serves a cassette's interactions back, each at most once.
///
/// Calls are matched on port, method and input rather than on position, so
/// concurrently running phases may ask for their interactions in any order.
pub struct CassetteReplayer {
    /// Recorded interactions with a consumed flag, in recorded order.
    queue: Vec<(Interaction, bool)>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        Self {
            queue: cassette.interactions.iter().cloned().map(|i| (i, false)).collect(),
        }
    }

    /// Take the first unconsumed interaction recorded for this port, method and input.
    ///
    /// Returns `None` when the cassette has no (more) such interactions.
    pub fn take(&mut self, port: &str, method: &str, input: &Value) -> Option<Interaction> {
        let (interaction, consumed) = self
            .queue
            .iter_mut()
            .find(|(interaction, consumed)| !*consumed && interaction.answers(port, method, input))?;
        *consumed = true;
        Some(interaction.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_cassette(interactions: Vec<Interaction>) -> Cassette {
        let mut cassette = Cassette::start("test", "/work/app");
        cassette.interactions = interactions;
        cassette
    }

    fn read(seq: u64, path: &str, text: &str) -> Interaction {
        Interaction {
            seq,
            port: "fs".into(),
            method: "read_to_string".into(),
            input: json!({"path": path}),
            output: json!({"ok": text}),
        }
    }

    #[test]
    fn serves_interactions_by_input_in_any_order() {
        let cassette = make_cassette(vec![read(0, "a.ts", "A"), read(1, "b.ts", "B")]);
        let mut replayer = CassetteReplayer::new(&cassette);

        let b = replayer.take("fs", "read_to_string", &json!({"path": "b.ts"})).unwrap();
        assert_eq!(b.seq, 1);
        let a = replayer.take("fs", "read_to_string", &json!({"path": "a.ts"})).unwrap();
        assert_eq!(a.output, json!({"ok": "A"}));
        assert!(replayer.take("fs", "read_to_string", &json!({"path": "b.ts"})).is_none());
    }

    #[test]
    fn repeated_calls_consume_repeated_recordings() {
        let cassette = make_cassette(vec![read(0, "a.ts", "first"), read(1, "a.ts", "second")]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let input = json!({"path": "a.ts"});

        assert_eq!(replayer.take("fs", "read_to_string", &input).unwrap().seq, 0);
        assert_eq!(replayer.take("fs", "read_to_string", &input).unwrap().seq, 1);
        assert!(replayer.take("fs", "read_to_string", &input).is_none());
    }

    #[test]
    fn unmatched_calls_leave_the_cassette_untouched() {
        let cassette = make_cassette(vec![read(0, "a.ts", "A")]);
        let mut replayer = CassetteReplayer::new(&cassette);

        assert!(replayer.take("fs", "glob", &json!({"pattern": "*"})).is_none());
        assert!(replayer.take("fs", "read_to_string", &json!({"path": "c.ts"})).is_none());
        assert_eq!(replayer.take("fs", "read_to_string", &json!({"path": "a.ts"})).unwrap().seq, 0);
    }
}
