use zerofish::{EngineChannel, Error, PipeHandle, Zerofish};

const FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn facade() -> (Zerofish, PipeHandle, PipeHandle) {
    let (zero, zero_pipe) = EngineChannel::pipe("zero");
    let (fish, fish_pipe) = EngineChannel::pipe("fish");
    (Zerofish::with_channels(zero, fish), zero_pipe, fish_pipe)
}

#[test]
fn uninitialized_net_rejects_without_sending() {
    let (zf, zero, _fish) = facade();
    let err = zf.go_zero(FEN).unwrap_err();
    assert!(matches!(err, Error::UninitializedNet));
    assert!(zero.drain_commands().is_empty(), "no command reaches the engine");
}

#[test]
fn set_net_enables_zero_search() {
    let (zf, zero, _fish) = facade();
    zf.set_net("testnet-enable", b"\x00\x01\x02").unwrap();
    assert_eq!(zf.net_name().as_deref(), Some("testnet-enable"));

    let weights_cmd = zero.drain_commands();
    assert_eq!(weights_cmd.len(), 1);
    assert!(weights_cmd[0].starts_with("setoption name WeightsFile value "));

    let pending = zf.go_zero(FEN).unwrap();
    let commands = zero.drain_commands();
    let expected = vec![format!("position fen {FEN}"), "go nodes 1".to_string()];
    assert_eq!(commands, expected);

    zero.feed_line("info string using network testnet-enable");
    zero.feed_line("bestmove e2e4 ponder e7e5");
    assert_eq!(pending.wait().unwrap(), "e2e4");
}

#[test]
fn set_net_spools_weight_bytes() {
    let (zf, zero, _fish) = facade();
    let payload = b"fake weight payload";
    zf.set_net("testnet-spool", payload).unwrap();

    let command = zero.drain_commands().remove(0);
    let path = command
        .strip_prefix("setoption name WeightsFile value ")
        .expect("weights option carries the spool path");
    assert_eq!(std::fs::read(path).unwrap(), payload);
}

#[test]
fn second_zero_request_while_pending_is_rejected() {
    let (zf, zero, _fish) = facade();
    zf.set_net("testnet-busy", b"w").unwrap();

    let pending = zf.go_zero(FEN).unwrap();
    zero.drain_commands();

    let err = zf.go_zero(FEN).unwrap_err();
    assert!(matches!(err, Error::Busy { engine: "zero" }));
    assert!(zero.drain_commands().is_empty());

    zero.feed_line("bestmove d2d4");
    assert_eq!(pending.wait().unwrap(), "d2d4");

    let _pending = zf.go_zero(FEN).unwrap();
    assert_eq!(zero.drain_commands().len(), 2);
}

#[test]
fn zero_search_command_is_configurable() {
    let (zero, zero_pipe) = EngineChannel::pipe("zero");
    let (fish, _fish_pipe) = EngineChannel::pipe("fish");
    let mut zf = Zerofish::with_channels(zero, fish);
    zf.set_zero_go("go nodes 64");
    zf.set_net("testnet-go", b"w").unwrap();
    zero_pipe.drain_commands();

    let _pending = zf.go_zero(FEN).unwrap();
    let commands = zero_pipe.drain_commands();
    assert_eq!(commands.last().map(String::as_str), Some("go nodes 64"));
}

#[test]
fn noise_lines_do_not_resolve_zero_request() {
    let (zf, zero, _fish) = facade();
    zf.set_net("testnet-noise", b"w").unwrap();
    let pending = zf.go_zero(FEN).unwrap();

    zero.feed_line("");
    zero.feed_line("info depth 1 nodes 1");
    assert!(pending.poll().is_none());

    zero.feed_line("bestmove g8f6");
    assert_eq!(pending.wait().unwrap(), "g8f6");
}
