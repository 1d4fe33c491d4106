// crates/comfoair-client/tests/engine_transactions.rs
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use comfoair_client::{ClientError, ComfoairClient, Link, LinkError};
use comfoair_core::{FanPreset, InvalidInput};
use comfoair_protocol::{encode_request, encode_response, Command, ProtocolError};

/// Replays canned replies and records every request it was handed.
#[derive(Clone, Default)]
struct ScriptedLink {
    state: Arc<Mutex<Script>>,
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Result<Vec<u8>, LinkError>>,
    requests: Vec<Vec<u8>>,
}

impl ScriptedLink {
    fn reply(&self, command: Command, payload: &[u8]) -> &Self {
        let mut raw = Vec::new();
        encode_response(command.opcode(), payload, &mut raw).unwrap();
        self.reply_raw(raw)
    }

    fn ack(&self) -> &Self {
        self.reply_raw(vec![0x07, 0xF3])
    }

    fn reply_raw(&self, raw: Vec<u8>) -> &Self {
        self.state.lock().unwrap().replies.push_back(Ok(raw));
        self
    }

    fn fail(&self, error: LinkError) -> &Self {
        self.state.lock().unwrap().replies.push_back(Err(error));
        self
    }

    fn requests(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().requests.clone()
    }
}

impl Link for ScriptedLink {
    fn exchange(&mut self, request: &[u8]) -> Result<Vec<u8>, LinkError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.to_vec());
        state.replies.pop_front().unwrap_or(Err(LinkError::NoResponse))
    }
}

fn request(command: Command, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    encode_request(command.opcode(), payload, &mut out).unwrap();
    out
}

fn fan_payload(supply: u8) -> [u8; 6] {
    [supply, supply, 0x07, 0x08, 0x07, 0x08]
}

#[test]
fn device_info_is_decoded() {
    let link = ScriptedLink::default();
    let mut payload = vec![3, 60, 0];
    payload.extend_from_slice(b"ComfoAir 350");
    link.reply(Command::DeviceInfo, &payload);

    let client = ComfoairClient::new(link.clone());
    let info = client.get_device_info().unwrap();

    assert_eq!(info.major_version, 3);
    assert_eq!(info.minor_version, 60);
    assert_eq!(info.device_name, "ComfoAir 350");
    assert_eq!(link.requests(), vec![vec![0x07, 0xF0, 0x00, 0x69, 0x00, 0x16, 0x07, 0x0F]]);
}

#[test]
fn status_issues_three_requests() {
    let link = ScriptedLink::default();
    link.reply(Command::TemperatureStatus, &[0x28, 0x30, 0x50, 0x52, 0x48])
        .reply(Command::FanStatus, &fan_payload(50))
        .reply(Command::ValveStatus, &[0xFF, 1, 0, 0]);

    let client = ComfoairClient::new(link.clone());
    let status = client.get_status().unwrap();

    assert_eq!(status.temperature.comfort, 0.0);
    assert_eq!(status.temperature.outside, 4.0);
    assert_eq!(status.fan.preset, FanPreset::Mid);
    assert_eq!(status.fan.supply_rpm, 1041);
    assert_eq!(status.valve.bypass, 0);
    assert!(status.valve.pre_heating);

    assert_eq!(
        link.requests(),
        vec![
            request(Command::TemperatureStatus, &[]),
            request(Command::FanStatus, &[]),
            request(Command::ValveStatus, &[]),
        ]
    );
}

#[test]
fn operating_time_is_decoded() {
    let link = ScriptedLink::default();
    let mut payload = [0u8; 20];
    payload[3..6].copy_from_slice(&[0x00, 0x00, 0x0A]);
    payload[15..17].copy_from_slice(&[0x00, 0x14]);
    payload[17..20].copy_from_slice(&[0x00, 0x00, 0x05]);
    link.reply(Command::OperatingTime, &payload);

    let hours = ComfoairClient::new(link).get_operating_time().unwrap();
    assert_eq!(hours.low_hours, 10);
    assert_eq!(hours.medium_hours, 0);
    assert_eq!(hours.filter_hours, 20);
    assert_eq!(hours.high_hours, 5);
}

#[test]
fn unknown_preset_code_falls_back_to_low() {
    let link = ScriptedLink::default();
    link.reply(Command::FanStatus, &fan_payload(99));

    let fan = ComfoairClient::new(link).get_fan_status().unwrap();
    assert_eq!(fan.preset, FanPreset::Low);
    assert!(fan.preset_fallback);
}

#[test]
fn set_preset_sends_speed_code() {
    let link = ScriptedLink::default();
    link.ack().ack();

    let client = ComfoairClient::new(link.clone());
    client.set_fan_preset("high").unwrap();
    client.set_fan_preset("").unwrap();

    assert_eq!(
        link.requests(),
        vec![
            request(Command::SetFanSpeed, &[4]),
            request(Command::SetFanSpeed, &[2]),
        ]
    );
}

#[test]
fn invalid_input_performs_no_io() {
    let link = ScriptedLink::default();
    let client = ComfoairClient::new(link.clone());

    let err = client.set_fan_preset("turbo").unwrap_err();
    assert!(matches!(err, ClientError::InvalidInput(InvalidInput::UnknownPreset(ref name)) if name == "turbo"));

    let err = client.set_fan_speed(0).unwrap_err();
    assert!(matches!(err, ClientError::InvalidInput(InvalidInput::FanSpeedOutOfRange(0))));
    assert!(client.set_fan_speed(5).is_err());

    assert!(link.requests().is_empty());
}

#[test]
fn bad_ack_never_reaches_the_decoder() {
    let link = ScriptedLink::default();
    link.reply_raw(vec![0x07, 0xF0, 0x07, 0xF0, 0x00, 0x0C, 0x06, 35, 35, 0, 0, 0, 0]);

    let err = ComfoairClient::new(link).get_fan_status().unwrap_err();
    match err {
        ClientError::Protocol { error, raw } => {
            assert_eq!(error, ProtocolError::BadAck { found: vec![0x07, 0xF0] });
            assert_eq!(raw.len(), 13);
        }
        other => panic!("expected protocol error, got {:?}", other),
    }
}

#[test]
fn short_payload_is_a_protocol_error() {
    let link = ScriptedLink::default();
    link.reply(Command::TemperatureStatus, &[0x28, 0x28]);

    let err = ComfoairClient::new(link).get_temperature_status().unwrap_err();
    assert!(matches!(
        err.as_protocol(),
        Some(ProtocolError::PayloadTooShort { needed: 5, available: 2, .. })
    ));
}

#[test]
fn link_failures_are_surfaced() {
    let link = ScriptedLink::default();
    link.fail(LinkError::NothingWritten);

    let client = ComfoairClient::new(link);
    assert!(matches!(client.get_valve_status(), Err(ClientError::Link(LinkError::NothingWritten))));
    // Script exhausted: the link reports silence.
    assert!(matches!(client.get_valve_status(), Err(ClientError::Link(LinkError::NoResponse))));
}

#[test]
fn toggle_on_without_memory_selects_low() {
    let link = ScriptedLink::default();
    link.ack();

    let client = ComfoairClient::new(link.clone());
    assert_eq!(client.remembered_preset(), None);
    client.toggle_fan(true).unwrap();

    assert_eq!(link.requests(), vec![request(Command::SetFanSpeed, &[2])]);
}

#[test]
fn toggle_off_then_on_restores_preset() {
    let link = ScriptedLink::default();
    link.reply(Command::FanStatus, &fan_payload(50)).ack().ack();

    let client = ComfoairClient::new(link.clone());
    client.toggle_fan(false).unwrap();
    assert_eq!(client.remembered_preset(), Some(FanPreset::Mid));
    client.toggle_fan(true).unwrap();

    assert_eq!(
        link.requests(),
        vec![
            request(Command::FanStatus, &[]),
            request(Command::SetFanSpeed, &[1]),
            request(Command::SetFanSpeed, &[3]),
        ]
    );
}

#[test]
fn toggle_off_while_off_keeps_memory() {
    let link = ScriptedLink::default();
    link.reply(Command::FanStatus, &fan_payload(70))
        .ack()
        .reply(Command::FanStatus, &fan_payload(15))
        .ack()
        .ack();

    let client = ComfoairClient::new(link.clone());
    client.toggle_fan(false).unwrap();
    client.toggle_fan(false).unwrap();
    assert_eq!(client.remembered_preset(), Some(FanPreset::High));

    client.toggle_fan(true).unwrap();
    assert_eq!(link.requests().last().unwrap(), &request(Command::SetFanSpeed, &[4]));
}

#[test]
fn toggle_off_with_unreadable_status_remembers_low() {
    let link = ScriptedLink::default();
    link.fail(LinkError::NoResponse).ack();

    let client = ComfoairClient::new(link.clone());
    client.toggle_fan(false).unwrap();

    assert_eq!(client.remembered_preset(), Some(FanPreset::Low));
    assert_eq!(link.requests().last().unwrap(), &request(Command::SetFanSpeed, &[1]));
}

#[test]
fn reset_forgets_remembered_preset() {
    let link = ScriptedLink::default();
    link.reply(Command::FanStatus, &fan_payload(70)).ack().ack();

    let client = ComfoairClient::new(link.clone());
    client.toggle_fan(false).unwrap();
    client.reset_toggle_memory();
    client.toggle_fan(true).unwrap();

    assert_eq!(link.requests().last().unwrap(), &request(Command::SetFanSpeed, &[2]));
}

/// Answers every request with a low-speed fan status, slowly, and counts
/// exchanges that started while another was still in flight.
#[derive(Clone, Default)]
struct SlowLink {
    busy: Arc<AtomicBool>,
    overlaps: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl Link for SlowLink {
    fn exchange(&mut self, _request: &[u8]) -> Result<Vec<u8>, LinkError> {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        thread::sleep(Duration::from_millis(2));
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.busy.store(false, Ordering::SeqCst);

        let mut raw = Vec::new();
        encode_response(Command::FanStatus.opcode(), &fan_payload(35), &mut raw).unwrap();
        Ok(raw)
    }
}

#[test]
fn concurrent_callers_do_not_interleave() {
    let link = SlowLink::default();
    let client = Arc::new(ComfoairClient::new(link.clone()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = Arc::clone(&client);
            thread::spawn(move || {
                for _ in 0..8 {
                    assert_eq!(client.get_fan_status().unwrap().preset, FanPreset::Low);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(link.calls.load(Ordering::SeqCst), 32);
    assert_eq!(link.overlaps.load(Ordering::SeqCst), 0);
}

/// Panics on its first exchange, acknowledges every later one.
#[derive(Default)]
struct PanicOnceLink {
    calls: usize,
}

impl Link for PanicOnceLink {
    fn exchange(&mut self, _request: &[u8]) -> Result<Vec<u8>, LinkError> {
        self.calls += 1;
        if self.calls == 1 {
            panic!("link failed mid-transaction");
        }
        Ok(vec![0x07, 0xF3])
    }
}

#[test]
fn engine_survives_a_panicking_caller() {
    let client = ComfoairClient::new(PanicOnceLink::default());

    let first = panic::catch_unwind(AssertUnwindSafe(|| client.set_fan_speed(3)));
    assert!(first.is_err());

    client.set_fan_speed(2).unwrap();
    assert!(client.remembered_preset().is_none());
}
