//! Channel-based data source.
//!
//! Receives record sets via a tokio watch channel, for hosts that embed the
//! viewer and push data rather than writing files.

use diagchart_types::Record;
use tokio::sync::watch;

use super::DataSource;

/// A data source that receives records via a channel.
///
/// # Example
///
/// ```
/// use diagchart::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("collector");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Vec<Record>>,
    description: String,
    initial_returned: bool,
}

impl ChannelSource {
    pub fn new(receiver: watch::Receiver<Vec<Record>>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            initial_returned: false,
        }
    }

    /// Create a channel pair for sending records to a ChannelSource.
    pub fn create(source_description: &str) -> (watch::Sender<Vec<Record>>, Self) {
        let (tx, rx) = watch::channel(Vec::new());
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Vec<Record>> {
        // The initial value counts as new data
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");

        assert_eq!(source.poll(), Some(Vec::new()));
        assert!(source.poll().is_none());

        let record = Record::builder().field("_key", "7.0.4").field("value", 2).build();
        tx.send(vec![record.clone()]).unwrap();

        assert_eq!(source.poll(), Some(vec![record]));
        assert_eq!(source.description(), "channel: test");
    }
}
