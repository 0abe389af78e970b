//! Destinations for streamed text deltas.

use crate::model::Message;

/// Receives the deltas of a streamed reply, in order.
///
/// The sink owns the assembled text; producers never keep a copy.
pub trait Sink {
    fn append(&mut self, delta: &str);
}

impl Sink for String {
    fn append(&mut self, delta: &str) {
        self.push_str(delta);
    }
}

/// Keeps each delta separately.
impl Sink for Vec<String> {
    fn append(&mut self, delta: &str) {
        self.push(delta.to_string());
    }
}

/// A message being streamed grows its content.
impl Sink for Message {
    fn append(&mut self, delta: &str) {
        self.content.push_str(delta);
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn append(&mut self, delta: &str) {
        (**self).append(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_all<S: Sink>(mut sink: S, deltas: &[&str]) {
        for delta in deltas {
            sink.append(delta);
        }
    }

    #[test]
    fn test_string_concatenates() {
        let mut text = String::new();
        write_all(&mut text, &["Bone ", "density ", "loss"]);
        assert_eq!(text, "Bone density loss");
    }

    #[test]
    fn test_vec_records_each_delta() {
        let mut deltas: Vec<String> = Vec::new();
        write_all(&mut deltas, &["A", "B"]);
        assert_eq!(deltas, vec!["A", "B"]);
    }

    #[test]
    fn test_message_appends_to_content() {
        let mut message = Message::assistant("");
        write_all(&mut message, &["🔬 ", "Findings"]);
        assert_eq!(message.content, "🔬 Findings");
    }
}
