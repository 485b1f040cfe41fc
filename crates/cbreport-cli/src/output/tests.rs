// Tests for output routing and formatting
//
// Reports must land on the data stream untouched apart from the final
// newline, while status messages go to the status stream.

use super::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn writer(quiet: bool, verbose: u8) -> (OutputWriter, SharedBuffer, SharedBuffer) {
    let out = SharedBuffer::default();
    let status = SharedBuffer::default();
    let writer = OutputWriter::with_writers(
        false,
        quiet,
        verbose,
        Box::new(out.clone()),
        Box::new(status.clone()),
    );
    (writer, out, status)
}

#[test]
fn test_report_adds_missing_newline() {
    let (mut output, out, status) = writer(false, 0);
    output.report("{\n    \"a\": 1\n}").unwrap();
    assert_eq!(out.contents(), "{\n    \"a\": 1\n}\n");
    assert_eq!(status.contents(), "");
}

#[test]
fn test_report_keeps_existing_newline() {
    let (mut output, out, _) = writer(false, 0);
    output.report("Overview:\n    Workload: cpusoaker\n\n").unwrap();
    assert_eq!(out.contents(), "Overview:\n    Workload: cpusoaker\n\n");
}

#[test]
fn test_status_messages_go_to_status_stream() {
    let (mut output, out, status) = writer(false, 0);
    output.info("Reading run.json").unwrap();
    output.success("Saved").unwrap();
    output.warning("No results").unwrap();
    output.error("Broken").unwrap();
    output.debug("hidden").unwrap();

    assert_eq!(out.contents(), "");
    assert_eq!(
        status.contents(),
        "INFO: Reading run.json\nSaved\nWARNING: No results\nERROR: Broken\n"
    );
}

#[test]
fn test_quiet_suppresses_info_and_success() {
    let (mut output, _, status) = writer(true, 0);
    output.info("Reading run.json").unwrap();
    output.success("Saved").unwrap();
    output.warning("No results").unwrap();
    assert_eq!(status.contents(), "WARNING: No results\n");
}

#[test]
fn test_debug_when_verbose() {
    let (mut output, _, status) = writer(false, 1);
    output.debug("4 rows").unwrap();
    assert_eq!(status.contents(), "DEBUG: 4 rows\n");
}

#[test]
fn test_data_formats() {
    let value = serde_json::json!({"output": {"format": "text"}});

    let (mut output, out, _) = writer(false, 0);
    output.data(&value, ConfigFormat::Toml).unwrap();
    assert_eq!(out.contents(), "[output]\nformat = \"text\"\n");

    let (mut output, out, _) = writer(false, 0);
    output.data(&value, ConfigFormat::Json).unwrap();
    assert_eq!(out.contents(), "{\n  \"output\": {\n    \"format\": \"text\"\n  }\n}\n");

    let (mut output, out, _) = writer(false, 0);
    output.data(&value, ConfigFormat::Yaml).unwrap();
    assert_eq!(out.contents(), "output:\n  format: text\n");
}
