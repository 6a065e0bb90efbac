//! Shared test utilities used across tensorbench crates.

pub mod archive {
    //! Zip fixtures for extractor tests.
    use std::fs::File;
    use std::io::{self, Write};
    use std::path::Path;

    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    /// Writes a zip archive at `path` containing `entries` as
    /// `(member name, contents)` pairs. Names ending in `/` become directory
    /// entries.
    ///
    /// # Errors
    /// Returns an I/O error if the archive cannot be written.
    ///
    /// # Examples
    /// ```
    /// use tensorbench_test_support::archive::write_zip;
    ///
    /// let dir = tempfile::tempdir()?;
    /// let path = dir.path().join("fixture.zip");
    /// write_zip(&path, &[("a.txt", b"alpha".as_slice())])?;
    /// assert!(path.exists());
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) -> io::Result<()> {
        let mut writer = ZipWriter::new(File::create(path)?);
        for (name, contents) in entries {
            if name.ends_with('/') {
                writer
                    .add_directory(*name, SimpleFileOptions::default())
                    .map_err(io::Error::other)?;
                continue;
            }
            writer
                .start_file(*name, SimpleFileOptions::default())
                .map_err(io::Error::other)?;
            writer.write_all(contents)?;
        }
        writer.finish().map_err(io::Error::other)?;
        Ok(())
    }
}

pub mod io {
    //! Readers that stand in for network response bodies.
    use std::io::{self, Read};

    /// A reader yielding `len` copies of a fill byte, at most `chunk` bytes
    /// per call, optionally failing once `fail_after` bytes have been served.
    ///
    /// # Examples
    /// ```
    /// use std::io::Read;
    /// use tensorbench_test_support::io::ScriptedBody;
    ///
    /// let mut body = ScriptedBody::new(10, 4);
    /// let mut out = Vec::new();
    /// body.read_to_end(&mut out)?;
    /// assert_eq!(out, vec![0xAB; 10]);
    /// # Ok::<(), std::io::Error>(())
    /// ```
    #[derive(Clone, Debug)]
    pub struct ScriptedBody {
        remaining: usize,
        chunk: usize,
        served: usize,
        fail_after: Option<usize>,
    }

    impl ScriptedBody {
        /// Fill byte served by every read.
        pub const FILL: u8 = 0xAB;

        /// Creates a body of `len` bytes served in reads of up to `chunk`
        /// bytes.
        #[must_use]
        pub const fn new(len: usize, chunk: usize) -> Self {
            Self {
                remaining: len,
                chunk,
                served: 0,
                fail_after: None,
            }
        }

        /// Makes the body fail with `ConnectionReset` once `bytes` have been
        /// served.
        #[must_use]
        pub const fn failing_after(mut self, bytes: usize) -> Self {
            self.fail_after = Some(bytes);
            self
        }
    }

    impl Read for ScriptedBody {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.fail_after.is_some_and(|limit| self.served >= limit) {
                return Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "scripted connection reset",
                ));
            }
            let budget = self
                .fail_after
                .map_or(usize::MAX, |limit| limit.saturating_sub(self.served));
            let len = self.remaining.min(self.chunk).min(buf.len()).min(budget);
            for byte in buf.iter_mut().take(len) {
                *byte = Self::FILL;
            }
            self.remaining = self.remaining.saturating_sub(len);
            self.served = self.served.saturating_add(len);
            Ok(len)
        }
    }
}

pub mod tracing {
    //! Recording layer for asserting emitted events in tests.
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::{Arc, Mutex, PoisonError};

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::Context;

    /// Layer that captures every event so tests can assert on diagnostics.
    ///
    /// # Examples
    /// ```
    /// use tensorbench_test_support::tracing::RecordingLayer;
    /// use tracing_subscriber::layer::SubscriberExt;
    ///
    /// let layer = RecordingLayer::default();
    /// let subscriber = tracing_subscriber::registry().with(layer.clone());
    /// tracing::subscriber::with_default(subscriber, || tracing::info!(bytes = 3, "done"));
    /// assert!(layer.has_message("done"));
    /// ```
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        events: Arc<Mutex<Vec<EventRecord>>>,
    }

    impl RecordingLayer {
        /// Returns a snapshot of recorded events in emission order.
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Returns `true` if any recorded event carries `message`.
        #[must_use]
        pub fn has_message(&self, message: &str) -> bool {
            self.events()
                .iter()
                .any(|event| event.fields.get("message").is_some_and(|m| m == message))
        }
    }

    /// Snapshot of an emitted event.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EventRecord {
        /// Level of the event.
        pub level: Level,
        /// Target of the event.
        pub target: String,
        /// Structured fields, including `message`.
        pub fields: HashMap<String, String>,
    }

    impl<S: Subscriber> Layer<S> for RecordingLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut FieldRecorder {
                fields: &mut fields,
            });
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(EventRecord {
                    level: *event.metadata().level(),
                    target: event.metadata().target().to_owned(),
                    fields,
                });
        }
    }

    struct FieldRecorder<'a> {
        fields: &'a mut HashMap<String, String>,
    }

    impl Visit for FieldRecorder<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.fields
                .insert(field.name().to_owned(), value.to_owned());
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.fields
                .insert(field.name().to_owned(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.fields
                .insert(field.name().to_owned(), format!("{value:?}"));
        }
    }
}
