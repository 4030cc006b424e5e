//! Stream-based data source.
//!
//! Receives records from an async byte stream of newline-delimited JSON,
//! such as a TCP connection.

use std::sync::{Arc, Mutex};

use diagchart_types::Record;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

use super::{records_from_str, records_from_value, DataSource};

/// Records kept by a stream source unless told otherwise.
pub const DEFAULT_MAX_RECORDS: usize = 100_000;

/// A data source that accumulates records from an async stream.
///
/// A background task reads newline-delimited JSON from the reader. Each line
/// may hold one record or a whole document; received records accumulate, and
/// every poll that sees new data returns the retained set. Once more than
/// `max_records` have arrived the oldest are evicted first.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use diagchart::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"{\"time\": 0, \"count\": 1}\n";
/// let source = StreamSource::spawn(Cursor::new(data.to_vec()), "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<Vec<Record>>,
    description: String,
    records: Vec<Record>,
    max_records: usize,
    shared_error: Arc<Mutex<Option<String>>>,
    last_error: Option<String>,
}

fn set_error(slot: &Mutex<Option<String>>, error: Option<String>) {
    if let Ok(mut guard) = slot.lock() {
        *guard = error;
    }
}

impl StreamSource {
    /// Spawn a background task that reads from the given async reader.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);
        let shared_error = Arc::new(Mutex::new(None));
        let error_handle = shared_error.clone();

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        set_error(&error_handle, Some("Connection closed".to_string()));
                        break;
                    }
                    Ok(_) if line.trim().is_empty() => continue,
                    Ok(_) => match serde_json::from_str(line.trim()) {
                        Ok(value) => {
                            set_error(&error_handle, None);
                            if tx.send(records_from_value(value)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "skipping malformed line");
                            set_error(&error_handle, Some(format!("Parse error: {}", e)));
                        }
                    },
                    Err(e) => {
                        set_error(&error_handle, Some(format!("Read error: {}", e)));
                        break;
                    }
                }
            }
        });

        Self::with_receiver(rx, description, shared_error)
    }

    /// Create a StreamSource fed by raw JSON messages.
    ///
    /// Each message is a JSON document or newline-delimited JSON.
    pub fn from_bytes_channel(mut rx: mpsc::Receiver<Vec<u8>>, description: &str) -> Self {
        let (tx, records_rx) = mpsc::channel(16);
        let shared_error = Arc::new(Mutex::new(None));
        let error_handle = shared_error.clone();

        tokio::spawn(async move {
            while let Some(bytes) = rx.recv().await {
                let parsed = std::str::from_utf8(&bytes)
                    .map_err(|e| format!("Parse error: {}", e))
                    .and_then(|text| records_from_str(text).map_err(|e| e.to_string()));
                match parsed {
                    Ok(records) => {
                        set_error(&error_handle, None);
                        if tx.send(records).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => set_error(&error_handle, Some(e)),
                }
            }
        });

        Self::with_receiver(records_rx, description, shared_error)
    }

    fn with_receiver(
        receiver: mpsc::Receiver<Vec<Record>>,
        description: &str,
        shared_error: Arc<Mutex<Option<String>>>,
    ) -> Self {
        Self {
            receiver,
            description: format!("stream: {}", description),
            records: Vec::new(),
            max_records: DEFAULT_MAX_RECORDS,
            shared_error,
            last_error: None,
        }
    }

    /// Keep at most `max_records` records (at least one).
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records.max(1);
        self
    }

    fn evict_oldest(&mut self) {
        if self.records.len() > self.max_records {
            let excess = self.records.len() - self.max_records;
            self.records.drain(..excess);
            tracing::debug!(evicted = excess, kept = self.records.len(), "stream retention cap reached");
        }
    }

    fn refresh_error(&mut self) {
        if let Ok(guard) = self.shared_error.lock() {
            self.last_error = guard.clone();
        }
    }
}

impl DataSource for StreamSource {
    fn poll(&mut self) -> Option<Vec<Record>> {
        let mut received = false;
        loop {
            match self.receiver.try_recv() {
                Ok(batch) => {
                    self.records.extend(batch);
                    received = true;
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    set_error(&self.shared_error, Some("Stream disconnected".to_string()));
                    break;
                }
            }
        }
        self.evict_oldest();
        self.refresh_error();
        received.then(|| self.records.clone())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
