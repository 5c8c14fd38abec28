use super::*;

#[test]
fn guard_reopens_the_gate_when_dropped() {
    let gate = RebootGate::new();
    {
        let _guard = gate.enter().unwrap();
        assert_eq!(gate.phase(), Phase::Rebooting);
        assert_eq!(gate.check(), Err(SessionError::RebootInProgress));
    }
    assert_eq!(gate.phase(), Phase::Running);
    assert_eq!(gate.check(), Ok(()));
}

#[test]
fn second_entry_is_rejected_without_disturbing_the_first() {
    let gate = RebootGate::new();
    let shared = gate.clone();

    let guard = gate.enter().unwrap();
    assert_eq!(shared.enter().err(), Some(SessionError::RebootInProgress));
    assert_eq!(shared.phase(), Phase::Rebooting);

    drop(guard);
    assert_eq!(shared.phase(), Phase::Running);
}

#[test]
fn closed_gate_stays_closed() {
    let gate = RebootGate::new();
    gate.close();
    assert_eq!(gate.enter().err(), Some(SessionError::Unloaded));
    assert_eq!(gate.phase(), Phase::Unloaded);
}
