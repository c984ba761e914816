//==============================================================================
// Worker process side of the process pool
//==============================================================================
//
// A worker reads one JSON request per line on stdin, runs it, and writes one
// JSON response per line on stdout. EOF on stdin means the pool is done with
// it. Logs go to stderr so stdout carries nothing but responses.

use crate::error::Result;
use crate::interpreter_lock::InterpreterLock;
use crate::workload::{Outcome, Workload};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::io::{BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Flag that switches the executable into worker mode.
pub const WORKER_FLAG: &str = "--worker";
/// Carries the parent's interpreter lock mode to a worker.
pub const LOCK_FLAG: &str = "--lock";
/// Carries the parent's switch interval to a worker.
pub const SWITCH_INTERVAL_FLAG: &str = "--switch-interval";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: usize,
    pub workload: Workload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: usize,
    pub result: std::result::Result<Outcome, String>,
}

/// Serves requests until `input` reaches EOF. Returns the number served.
///
/// A panicking workload is reported back as an `Err` response and the worker
/// keeps serving; a malformed request line ends the worker with an error.
pub fn serve<R: BufRead, W: Write>(input: R, mut output: W, lock: &InterpreterLock) -> Result<usize> {
    let mut served = 0;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let request: Request = serde_json::from_str(&line)?;
        debug!(task = request.id, workload = %request.workload, "worker received task");

        let result = panic::catch_unwind(AssertUnwindSafe(|| request.workload.run(lock)))
            .map_err(|payload| panic_message(payload.as_ref()));

        let response = Response {
            id: request.id,
            result,
        };
        serde_json::to_writer(&mut output, &response)?;
        output.write_all(b"\n")?;
        output.flush()?;
        served += 1;
    }

    debug!(served, "worker input closed");
    Ok(served)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DemoError;
    use std::io::Cursor;
    use std::time::Duration;

    fn encode(requests: &[Request]) -> String {
        requests
            .iter()
            .map(|r| serde_json::to_string(r).unwrap() + "\n")
            .collect()
    }

    fn decode(output: &[u8]) -> Vec<Response> {
        String::from_utf8_lossy(output)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_serves_each_request_in_order() {
        let input = encode(&[
            Request {
                id: 0,
                workload: Workload::count_primes(100),
            },
            Request {
                id: 1,
                workload: Workload::simulate_io(Duration::from_millis(1)),
            },
        ]);
        let mut output = Vec::new();

        let served = serve(Cursor::new(input), &mut output, &InterpreterLock::global()).unwrap();

        assert_eq!(served, 2);
        assert_eq!(
            decode(&output),
            vec![
                Response {
                    id: 0,
                    result: Ok(Outcome::Primes(25)),
                },
                Response {
                    id: 1,
                    result: Ok(Outcome::Slept(Duration::from_millis(1))),
                },
            ]
        );
    }

    #[test]
    fn test_empty_input_serves_nothing() {
        let mut output = Vec::new();
        let served = serve(Cursor::new(""), &mut output, &InterpreterLock::free()).unwrap();
        assert_eq!(served, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let input = format!(
            "\n{}\n\n",
            serde_json::to_string(&Request {
                id: 4,
                workload: Workload::count_primes(10),
            })
            .unwrap()
        );
        let mut output = Vec::new();
        let served = serve(Cursor::new(input), &mut output, &InterpreterLock::free()).unwrap();
        assert_eq!(served, 1);
        assert_eq!(decode(&output)[0].result, Ok(Outcome::Primes(4)));
    }

    #[test]
    fn test_malformed_request_is_an_error() {
        let mut output = Vec::new();
        let result = serve(Cursor::new("not json\n"), &mut output, &InterpreterLock::free());
        assert!(matches!(result, Err(DemoError::Protocol(_))));
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload: Box<dyn Any + Send> = Box::new(format!("task {}", 3));
        assert_eq!(panic_message(payload.as_ref()), "task 3");

        let payload: Box<dyn Any + Send> = Box::new(17u8);
        assert_eq!(panic_message(payload.as_ref()), "worker task panicked");
    }
}
