use zerofish::{EngineChannel, PipeHandle, SearchOpts, Zerofish};

const FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn facade() -> (Zerofish, PipeHandle, PipeHandle) {
    let (zero, zero_pipe) = EngineChannel::pipe("zero");
    let (fish, fish_pipe) = EngineChannel::pipe("fish");
    (Zerofish::with_channels(zero, fish), zero_pipe, fish_pipe)
}

#[test]
fn stop_skips_uninitialized_zero_engine() {
    let (zf, zero, fish) = facade();
    zf.stop().unwrap();
    assert!(zero.drain_commands().is_empty());
    assert_eq!(fish.drain_commands(), vec!["stop".to_string()]);
}

#[test]
fn stop_reaches_both_engines_once_net_is_set() {
    let (zf, zero, fish) = facade();
    zf.set_net("net-stop", b"w").unwrap();
    zero.drain_commands();

    zf.stop().unwrap();
    assert_eq!(zero.drain_commands(), vec!["stop".to_string()]);
    assert_eq!(fish.drain_commands(), vec!["stop".to_string()]);
}

#[test]
fn reset_sends_newgame_to_fish_always_and_zero_when_ready() {
    let (zf, zero, fish) = facade();
    zf.reset().unwrap();
    assert!(zero.drain_commands().is_empty(), "uninitialized zero engine is left alone");
    assert_eq!(fish.drain_commands(), vec!["stop".to_string(), "ucinewgame".to_string()]);

    zf.set_net("net-reset", b"w").unwrap();
    zero.drain_commands();

    zf.reset().unwrap();
    assert_eq!(zero.drain_commands(), vec!["stop".to_string(), "ucinewgame".to_string()]);
    assert_eq!(fish.drain_commands(), vec!["stop".to_string(), "ucinewgame".to_string()]);
}

#[test]
fn quit_terminates_both_engines() {
    let (zf, zero, fish) = facade();
    zf.quit().unwrap();
    assert_eq!(zero.drain_commands(), vec!["quit".to_string()]);
    assert_eq!(fish.drain_commands(), vec!["stop".to_string(), "quit".to_string()]);
}

#[test]
fn set_search_updates_the_stored_default() {
    let (zf, _zero, fish) = facade();
    zf.set_search(SearchOpts { depth: 5, pvs: 2, movetime_ms: None });

    let _pending = zf.go_fish(FEN, None).unwrap();
    let commands = fish.drain_commands();
    assert_eq!(commands[0], "setoption name multipv value 2");
    assert_eq!(commands.last().map(String::as_str), Some("go depth 5"));
}

#[test]
fn per_request_opts_do_not_touch_the_default() {
    let (zf, _zero, fish) = facade();
    let opts = SearchOpts { depth: 3, pvs: 1, movetime_ms: None };
    let pending = zf.go_fish(FEN, Some(opts)).unwrap();
    fish.drain_commands();
    fish.feed_line("bestmove e2e4");
    pending.wait().unwrap();

    let _pending = zf.go_fish(FEN, None).unwrap();
    let commands = fish.drain_commands();
    assert_eq!(commands.last().map(String::as_str), Some("go depth 12"));
}

#[test]
fn raw_passthrough_reaches_each_engine() {
    let (zf, zero, fish) = facade();
    zf.send_zero("uci").unwrap();
    zf.send_fish("isready").unwrap();
    assert_eq!(zero.drain_commands(), vec!["uci".to_string()]);
    assert_eq!(fish.drain_commands(), vec!["isready".to_string()]);
}

#[test]
fn net_name_tracks_identity() {
    let (zf, _zero, _fish) = facade();
    assert_eq!(zf.net_name(), None);
    zf.set_net("maia-1100", b"w").unwrap();
    assert_eq!(zf.net_name().as_deref(), Some("maia-1100"));
}

#[test]
fn dropping_the_facade_abandons_a_pending_request() {
    let (zf, _zero, fish) = facade();
    let pending = zf.go_fish(FEN, None).unwrap();
    fish.drain_commands();
    // Both ends of the channel go away, taking the installed hook (and the
    // request's completion sender) with them.
    drop(zf);
    drop(fish);
    assert!(pending.wait().is_err(), "abandoned request surfaces an error, not a hang");
}
