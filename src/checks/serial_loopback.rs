//! Serial loopback check.
//!
//! The carrier jumpers each tested UART's TX straight back to RX.  The
//! check writes a canned message, lets the wire settle, then does one
//! bounded read and compares byte-for-byte.  No retry loop: at 9600
//! baud the settle interval is enough for the whole message, and a
//! board that needs more than that has failed anyway.

use log::{debug, info, warn};

use crate::app::ports::{SerialPort, TimePort};
use crate::config::TestPlan;
use crate::error::Result;
use crate::guard::SerialLease;

use super::Verdict;

/// Canned loopback message.
pub const TEST_MESSAGE: &[u8] = b"Testing, Testing, 1, 2, 3";

/// Read-back buffer size.  Larger than the message so over-length echo
/// (noise, framing garbage) is observed and fails the comparison.
const RECEIVE_BUFFER_SIZE: usize = 128;

/// Run the check over every configured channel.  An empty channel list
/// trivially passes.
pub fn run_all<S, T>(serial: &mut S, clock: &mut T, plan: &TestPlan) -> Result<Verdict>
where
    S: SerialPort,
    T: TimePort,
{
    if plan.serial_channels.is_empty() {
        return Ok(Verdict::Pass);
    }

    let mut verdict = Verdict::Pass;
    for &channel in &plan.serial_channels {
        verdict = verdict.and(check_channel(
            serial,
            clock,
            channel,
            plan.serial_baud,
            plan.serial_settle_ms,
        )?);
    }

    info!(
        "serial-loopback: {} channel(s) — {:?}",
        plan.serial_channels.len(),
        verdict
    );
    Ok(verdict)
}

/// Exercise one channel.  The lease is released on every exit path.
pub fn check_channel<S, T>(
    serial: &mut S,
    clock: &mut T,
    channel: u8,
    baud: u32,
    settle_ms: u32,
) -> Result<Verdict>
where
    S: SerialPort,
    T: TimePort,
{
    let mut lease = SerialLease::open(serial, channel, baud)?;

    let result = write_settle_read(serial, clock, &lease, settle_ms);

    lease.release(serial);
    result
}

fn write_settle_read<S, T>(
    serial: &mut S,
    clock: &mut T,
    lease: &SerialLease,
    settle_ms: u32,
) -> Result<Verdict>
where
    S: SerialPort,
    T: TimePort,
{
    // Write the full message; the driver may take it in pieces.
    let mut sent = 0;
    while sent < TEST_MESSAGE.len() {
        sent += lease.write(serial, &TEST_MESSAGE[sent..])?;
    }
    debug!("serial-loopback: UART{} sent {sent} bytes", lease.channel());

    // Let the wire round-trip before the single read.
    clock.sleep_ms(settle_ms);

    let mut buf = [0u8; RECEIVE_BUFFER_SIZE];
    let received = lease.read(serial, &mut buf)?;

    if received == 0 {
        warn!("serial-loopback: FAIL — UART{} echoed nothing", lease.channel());
        return Ok(Verdict::Fail);
    }

    // The echo must be a prefix of the message: every received byte is
    // compared, and anything longer than the message is garbage.
    if received > TEST_MESSAGE.len() || buf[..received] != TEST_MESSAGE[..received] {
        warn!(
            "serial-loopback: FAIL — UART{} echoed {received} byte(s) that do not match the sent message",
            lease.channel()
        );
        return Ok(Verdict::Fail);
    }

    debug!(
        "serial-loopback: UART{} echoed {received}/{} byte(s) correctly",
        lease.channel(),
        TEST_MESSAGE.len()
    );
    Ok(Verdict::Pass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::RawSerial;
    use crate::error::{Error, SerialError};
    use core::result::Result;

    /// Looped-back UART stand-in with scriptable misbehaviour.
    struct EchoUart {
        rx: Vec<u8>,
        open: bool,
        closes: u32,
        /// Bytes the driver accepts per write call (exercises the
        /// partial-write loop).
        write_chunk: usize,
        /// Drop the echo entirely.
        mute: bool,
        /// Corrupt this byte index in the echo.
        corrupt_at: Option<usize>,
        /// Truncate the echo to this many bytes.
        truncate_to: Option<usize>,
        fail_read: bool,
        fail_open: bool,
    }

    impl EchoUart {
        fn new() -> Self {
            Self {
                rx: Vec::new(),
                open: false,
                closes: 0,
                write_chunk: usize::MAX,
                mute: false,
                corrupt_at: None,
                truncate_to: None,
                fail_read: false,
                fail_open: false,
            }
        }
    }

    impl SerialPort for EchoUart {
        fn open(&mut self, channel: u8, _baud: u32) -> Result<RawSerial, SerialError> {
            if self.fail_open {
                return Err(SerialError::OpenFailed { channel, rc: -1 });
            }
            self.open = true;
            Ok(RawSerial(7))
        }

        fn write(&mut self, _raw: RawSerial, data: &[u8]) -> Result<usize, SerialError> {
            let taken = data.len().min(self.write_chunk);
            if !self.mute {
                self.rx.extend_from_slice(&data[..taken]);
            }
            Ok(taken)
        }

        fn read(&mut self, _raw: RawSerial, buf: &mut [u8]) -> Result<usize, SerialError> {
            if self.fail_read {
                return Err(SerialError::ReadFailed { channel: 1, rc: -9 });
            }
            if let Some(limit) = self.truncate_to {
                self.rx.truncate(limit);
            }
            if let Some(i) = self.corrupt_at {
                if i < self.rx.len() {
                    self.rx[i] ^= 0xFF;
                }
            }
            let n = self.rx.len().min(buf.len());
            buf[..n].copy_from_slice(&self.rx[..n]);
            self.rx.clear();
            Ok(n)
        }

        fn close(&mut self, _raw: RawSerial) -> Result<(), SerialError> {
            self.open = false;
            self.closes += 1;
            Ok(())
        }
    }

    struct NoClock;
    impl TimePort for NoClock {
        fn sleep_ms(&mut self, _ms: u32) {}
        fn uptime_ms(&self) -> u64 {
            0
        }
    }

    #[test]
    fn clean_echo_passes() {
        let mut uart = EchoUart::new();
        let v = check_channel(&mut uart, &mut NoClock, 1, 9600, 22).unwrap();
        assert_eq!(v, Verdict::Pass);
        assert!(!uart.open, "channel closed after the check");
        assert_eq!(uart.closes, 1);
    }

    #[test]
    fn partial_writes_are_looped_until_complete() {
        let mut uart = EchoUart::new();
        uart.write_chunk = 3;
        let v = check_channel(&mut uart, &mut NoClock, 1, 9600, 22).unwrap();
        assert_eq!(v, Verdict::Pass);
    }

    #[test]
    fn silent_channel_fails() {
        let mut uart = EchoUart::new();
        uart.mute = true;
        let v = check_channel(&mut uart, &mut NoClock, 1, 9600, 22).unwrap();
        assert_eq!(v, Verdict::Fail);
        assert_eq!(uart.closes, 1);
    }

    #[test]
    fn corrupted_echo_fails() {
        let mut uart = EchoUart::new();
        uart.corrupt_at = Some(4);
        let v = check_channel(&mut uart, &mut NoClock, 1, 9600, 22).unwrap();
        assert_eq!(v, Verdict::Fail);
    }

    #[test]
    fn matching_prefix_shorter_than_message_passes() {
        // The comparison covers exactly the received length; a clean
        // prefix is accepted (slow wire, partial arrival at read time).
        let mut uart = EchoUart::new();
        uart.truncate_to = Some(10);
        let v = check_channel(&mut uart, &mut NoClock, 1, 9600, 22).unwrap();
        assert_eq!(v, Verdict::Pass);
    }

    #[test]
    fn read_failure_escalates_but_closes_channel() {
        let mut uart = EchoUart::new();
        uart.fail_read = true;
        let err = check_channel(&mut uart, &mut NoClock, 1, 9600, 22).unwrap_err();
        assert!(matches!(err, Error::Serial(SerialError::ReadFailed { .. })));
        assert_eq!(uart.closes, 1, "lease released on the error path");
    }

    #[test]
    fn open_failure_escalates() {
        let mut uart = EchoUart::new();
        uart.fail_open = true;
        assert!(check_channel(&mut uart, &mut NoClock, 1, 9600, 22).is_err());
        assert_eq!(uart.closes, 0);
    }

    #[test]
    fn empty_channel_list_trivially_passes() {
        let mut uart = EchoUart::new();
        let mut plan = TestPlan::default();
        plan.serial_channels.clear();
        let v = run_all(&mut uart, &mut NoClock, &plan).unwrap();
        assert_eq!(v, Verdict::Pass);
        assert_eq!(uart.closes, 0, "nothing opened for an empty plan");
    }
}
