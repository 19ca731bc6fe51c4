//! `.lg` route file reader, used only by the Evaluator. The Router's
//! own writer lives in [`crate::writer`]; this module only reads back
//! what was written, as a flat event stream the Evaluator folds over.

use std::path::Path;

use super::{is_blank, parse_token, read_lines};
use crate::error::Result;

/// One token of a `.lg` file, in file order. `NetStart`/`NetEnd` bracket
/// each net's `M1`/`M2`/`Via` steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LgEvent {
    NetStart(i32),
    M1 { x1: i64, y1: i64, x2: i64, y2: i64 },
    M2 { x1: i64, y1: i64, x2: i64, y2: i64 },
    Via,
    NetEnd,
}

/// Parse a `.lg` file into a flat event stream. Lines that don't match
/// any known command are logged and skipped.
pub fn parse_lg(path: &Path) -> Result<Vec<LgEvent>> {
    let lines = read_lines(path)?;
    let mut events = Vec::new();

    for (line_no, raw) in lines.iter().enumerate() {
        if is_blank(raw) {
            continue;
        }
        let mut tokens = raw.split_whitespace();
        let command = tokens.next().unwrap_or("");

        if let Some(rest) = command.strip_prefix('n') {
            match rest.parse::<i32>() {
                Ok(idx) => events.push(LgEvent::NetStart(idx)),
                Err(_) => log::error!("{}:{}: malformed net header {command:?}", path.display(), line_no + 1),
            }
            continue;
        }

        match command {
            "M1" => {
                if let Some(ev) = parse_segment(path, line_no, &mut tokens, true) {
                    events.push(ev);
                }
            }
            "M2" => {
                if let Some(ev) = parse_segment(path, line_no, &mut tokens, false) {
                    events.push(ev);
                }
            }
            "via" => events.push(LgEvent::Via),
            ".end" => events.push(LgEvent::NetEnd),
            other => log::error!("{}:{}: unknown command {other:?}", path.display(), line_no + 1),
        }
    }

    Ok(events)
}

fn parse_segment(path: &Path, line_no: usize, tokens: &mut std::str::SplitWhitespace, is_m1: bool) -> Option<LgEvent> {
    let x1 = parse_token::<i64>(path, line_no, tokens, "segment x1")?;
    let y1 = parse_token::<i64>(path, line_no, tokens, "segment y1")?;
    let x2 = parse_token::<i64>(path, line_no, tokens, "segment x2")?;
    let y2 = parse_token::<i64>(path, line_no, tokens, "segment y2")?;
    Some(if is_m1 {
        LgEvent::M1 { x1, y1, x2, y2 }
    } else {
        LgEvent::M2 { x1, y1, x2, y2 }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_a_net_with_a_via() {
        let contents = "\
n3
M1 0 0 0 1
via
M2 0 1 2 1
.end
";
        let path = write_tmp("gridroute_test.lg", contents);
        let events = parse_lg(&path).unwrap();
        assert_eq!(
            events,
            vec![
                LgEvent::NetStart(3),
                LgEvent::M1 { x1: 0, y1: 0, x2: 0, y2: 1 },
                LgEvent::Via,
                LgEvent::M2 { x1: 0, y1: 1, x2: 2, y2: 1 },
                LgEvent::NetEnd,
            ]
        );
        std::fs::remove_file(&path).ok();
    }
}
