//! Host and guest sessions played end to end over in-memory channels.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tictactoe_link::{
    ACK, Board, Channel, EngineError, Guest, Host, HumanInput, LinkTiming, LocalEngine,
    LossyChannel, Mark, MemoryChannel, Move, MoveEngine, Outcome, Position, ScriptedInput,
    ServiceEngine, SessionConfig, SessionError, Square, Starter, Transport, server,
};

fn config() -> SessionConfig {
    SessionConfig::default()
        .with_timing(200, 5, 3000)
        .with_engine_retries(2, 10)
}

/// Plays back fixed engine moves.
struct ScriptedEngine {
    moves: Mutex<VecDeque<Position>>,
}

impl ScriptedEngine {
    fn new(moves: impl IntoIterator<Item = (usize, usize)>) -> Self {
        Self {
            moves: Mutex::new(moves.into_iter().map(|(r, c)| Position::new(r, c)).collect()),
        }
    }
}

#[async_trait::async_trait]
impl MoveEngine for ScriptedEngine {
    async fn choose(
        &self,
        _board: &Board,
        _human: Mark,
        _ai: Mark,
    ) -> Result<Position, EngineError> {
        self.moves
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| EngineError::new("engine script exhausted"))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Always fails and counts calls.
struct FailingEngine {
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl MoveEngine for FailingEngine {
    async fn choose(
        &self,
        _board: &Board,
        _human: Mark,
        _ai: Mark,
    ) -> Result<Position, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(EngineError::new("service down"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Records the move number of every request.
struct RecordingInput {
    inner: ScriptedInput,
    numbers: Arc<Mutex<Vec<u32>>>,
}

#[async_trait::async_trait]
impl HumanInput for RecordingInput {
    async fn choose_starter(&mut self) -> Result<Starter, SessionError> {
        self.inner.choose_starter().await
    }

    async fn choose_move(&mut self, board: &Board, number: u32) -> Result<String, SessionError> {
        self.numbers.lock().unwrap().push(number);
        self.inner.choose_move(board, number).await
    }

    async fn play_again(&mut self) -> Result<bool, SessionError> {
        self.inner.play_again().await
    }
}

fn all_cells() -> Vec<&'static str> {
    vec!["a1", "b1", "c1", "a2", "b2", "c2", "a3", "b3", "c3"]
}

#[tokio::test]
async fn test_human_wins_top_row() {
    let config = config();
    let (host_end, guest_end) = MemoryChannel::pair();
    let host = Host::new(
        Transport::new(host_end, LinkTiming::from(&config)),
        Box::new(ScriptedEngine::new([(1, 0), (1, 1)])),
        config.clone(),
    );
    let input = ScriptedInput::new([Starter::Human], ["a1", "b1", "c1"], [false]);
    let guest = Guest::new(
        Transport::new(guest_end, LinkTiming::from(&config)),
        Box::new(input),
        &config,
    )
    .unwrap();

    let (host_summary, guest_summary) = tokio::join!(host.run(), guest.run());
    let host_summary = host_summary.unwrap();
    let guest_summary = guest_summary.unwrap();

    assert_eq!(host_summary.outcomes(), vec![Outcome::Won(Mark::X)]);
    assert_eq!(guest_summary.outcomes(), vec![Outcome::Won(Mark::X)]);

    let board = host_summary.games()[0].board();
    for col in 0..3 {
        assert_eq!(board.get(Position::new(0, col)), Some(Square::Occupied(Mark::X)));
    }
    assert_eq!(guest_summary.games()[0].board(), board);
    assert_eq!(guest_summary.games()[0].moves(), host_summary.games()[0].moves());
    assert_eq!(
        host_summary.games()[0].moves().first(),
        Some(&Move::new(Mark::X, Position::new(0, 0)))
    );
    assert_eq!(host_summary.games()[0].moves().len(), 5);
}

#[tokio::test]
async fn test_local_engine_beats_careless_human() {
    let config = config();
    let (host_end, guest_end) = MemoryChannel::pair();
    let host = Host::new(
        Transport::new(host_end, LinkTiming::from(&config)),
        Box::new(LocalEngine::new()),
        config.clone(),
    );
    let input = ScriptedInput::new([Starter::Automated], all_cells(), [false]);
    let guest = Guest::new(
        Transport::new(guest_end, LinkTiming::from(&config)),
        Box::new(input),
        &config,
    )
    .unwrap();

    let (host_summary, guest_summary) = tokio::join!(host.run(), guest.run());
    let host_summary = host_summary.unwrap();

    assert_eq!(host_summary.outcomes(), vec![Outcome::Won(Mark::X)]);
    assert_eq!(guest_summary.unwrap().games()[0].board(), host_summary.games()[0].board());
}

#[tokio::test]
async fn test_rejected_moves_are_asked_again_with_same_number() {
    let config = config();
    let (host_end, guest_end) = MemoryChannel::pair();
    let host = Host::new(
        Transport::new(host_end, LinkTiming::from(&config)),
        Box::new(ScriptedEngine::new([(0, 0), (1, 0)])),
        config.clone(),
    );
    let numbers = Arc::new(Mutex::new(Vec::new()));
    let input = RecordingInput {
        inner: ScriptedInput::new([Starter::Human], ["b2", "zz", "a1", "4d", "c1", "a3"], [false]),
        numbers: Arc::clone(&numbers),
    };
    let guest = Guest::new(
        Transport::new(guest_end, LinkTiming::from(&config)),
        Box::new(input),
        &config,
    )
    .unwrap();

    let (host_summary, guest_summary) = tokio::join!(host.run(), guest.run());
    let host_summary = host_summary.unwrap();

    assert_eq!(host_summary.outcomes(), vec![Outcome::Won(Mark::X)]);
    assert_eq!(*numbers.lock().unwrap(), vec![1, 2, 2, 2, 2, 3]);

    let board = host_summary.games()[0].board();
    assert_eq!(board.get(Position::new(0, 0)), Some(Square::Occupied(Mark::O)));
    assert_eq!(board.occupied(), 5);
    assert_eq!(guest_summary.unwrap().games()[0].board(), board);
}

#[tokio::test]
async fn test_reset_renegotiates_starter_and_marks() {
    let config = config();
    let (host_end, guest_end) = MemoryChannel::pair();
    let host = Host::new(
        Transport::new(host_end, LinkTiming::from(&config)),
        Box::new(ScriptedEngine::new([(1, 0), (1, 1), (0, 0), (0, 1), (0, 2)])),
        config.clone(),
    );
    let input = ScriptedInput::new(
        [Starter::Human, Starter::Automated],
        ["a1", "b1", "c1", "a2", "b2"],
        [true, false],
    );
    let guest = Guest::new(
        Transport::new(guest_end, LinkTiming::from(&config)),
        Box::new(input),
        &config,
    )
    .unwrap();

    let (host_summary, guest_summary) = tokio::join!(host.run(), guest.run());
    let host_summary = host_summary.unwrap();
    let guest_summary = guest_summary.unwrap();

    assert_eq!(host_summary.outcomes(), vec![Outcome::Won(Mark::X), Outcome::Won(Mark::X)]);

    let second = host_summary.games()[1].board();
    assert_eq!(second.occupied(), 5);
    assert_eq!(second.get(Position::new(0, 0)), Some(Square::Occupied(Mark::X)));
    assert_eq!(second.get(Position::new(1, 0)), Some(Square::Occupied(Mark::O)));
    assert_eq!(second.get(Position::new(1, 1)), Some(Square::Occupied(Mark::O)));
    assert_eq!(guest_summary.games()[1].board(), second);
}

#[tokio::test]
async fn test_silent_guest_is_protocol_timeout() {
    let config = SessionConfig::default().with_timing(20, 5, 200);
    let (host_end, _silent) = MemoryChannel::pair();
    let host = Host::new(
        Transport::new(host_end, LinkTiming::from(&config)),
        Box::new(LocalEngine::new()),
        config,
    );

    let err = host.run().await.unwrap_err();
    assert!(matches!(err, SessionError::ProtocolTimeout { .. }));
}

#[tokio::test]
async fn test_silent_host_is_protocol_timeout_for_guest() {
    let config = SessionConfig::default().with_timing(20, 5, 200);
    let (guest_end, _silent) = MemoryChannel::pair();
    let input = ScriptedInput::new([Starter::Human], ["a1"], [false]);
    let guest = Guest::new(
        Transport::new(guest_end, LinkTiming::from(&config)),
        Box::new(input),
        &config,
    )
    .unwrap();

    let err = guest.run().await.unwrap_err();
    assert!(matches!(err, SessionError::ProtocolTimeout { .. }));
}

#[tokio::test]
async fn test_unknown_start_choice_is_invalid_configuration() {
    let config = config();
    let (host_end, mut peer) = MemoryChannel::pair();
    let host = Host::new(
        Transport::new(host_end, LinkTiming::from(&config)),
        Box::new(LocalEngine::new()),
        config,
    );

    let responder = tokio::spawn(async move {
        loop {
            if let Some(line) = peer.poll_line().await.unwrap() {
                assert_eq!(line, "user_choice");
                peer.write_line(ACK).await.unwrap();
                peer.write_line("3").await.unwrap();
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        peer
    });

    let err = host.run().await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidConfiguration { .. }));
    drop(responder.await.unwrap());
}

#[tokio::test]
async fn test_engine_failures_are_retried_then_fatal() {
    let config = SessionConfig::default()
        .with_timing(200, 5, 1000)
        .with_engine_retries(2, 10);
    let calls = Arc::new(AtomicUsize::new(0));
    let (host_end, guest_end) = MemoryChannel::pair();
    let host = Host::new(
        Transport::new(host_end, LinkTiming::from(&config)),
        Box::new(FailingEngine {
            calls: Arc::clone(&calls),
        }),
        config.clone(),
    );
    let input = ScriptedInput::new([Starter::Automated], Vec::<String>::new(), Vec::new());
    let guest = Guest::new(
        Transport::new(guest_end, LinkTiming::from(&config)),
        Box::new(input),
        &config,
    )
    .unwrap();

    let (host_result, guest_result) = tokio::join!(host.run(), guest.run());

    assert!(matches!(host_result.unwrap_err(), SessionError::ServiceUnavailable(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(guest_result.is_err());
}

#[tokio::test]
async fn test_lost_first_write_does_not_break_session() {
    let config = config();
    let (host_end, guest_end) = MemoryChannel::pair();
    let lossy = LossyChannel::with_pattern(host_end, [true]);
    let host = Host::new(
        Transport::new(lossy, LinkTiming::from(&config)),
        Box::new(ScriptedEngine::new([(1, 0), (1, 1)])),
        config.clone(),
    );
    let input = ScriptedInput::new([Starter::Human], ["a1", "b1", "c1"], [false]);
    let guest = Guest::new(
        Transport::new(guest_end, LinkTiming::from(&config)),
        Box::new(input),
        &config,
    )
    .unwrap();

    let (host_summary, guest_summary) = tokio::join!(host.run(), guest.run());

    assert_eq!(host_summary.unwrap().outcomes(), vec![Outcome::Won(Mark::X)]);
    assert_eq!(guest_summary.unwrap().outcomes(), vec![Outcome::Won(Mark::X)]);
}

#[tokio::test]
async fn test_lost_ack_does_not_repeat_start_choice() {
    let config = config();
    let (host_end, guest_end) = MemoryChannel::pair();
    let host = Host::new(
        Transport::new(host_end, LinkTiming::from(&config)),
        Box::new(LocalEngine::new()),
        config.clone(),
    );
    let lossy_guest = LossyChannel::with_pattern(guest_end, [true]);
    let input = ScriptedInput::new([Starter::Automated], all_cells(), [false]);
    let guest = Guest::new(
        Transport::new(lossy_guest, LinkTiming::from(&config)),
        Box::new(input),
        &config,
    )
    .unwrap();

    let (host_summary, guest_summary) = tokio::join!(host.run(), guest.run());
    let host_summary = host_summary.unwrap();
    let guest_summary = guest_summary.unwrap();

    assert_eq!(host_summary.outcomes(), vec![Outcome::Won(Mark::X)]);
    assert_eq!(guest_summary.outcomes(), host_summary.outcomes());
    assert_eq!(
        guest_summary.games()[0].board(),
        host_summary.games()[0].board()
    );
}

#[tokio::test]
async fn test_service_engine_plays_full_session() {
    let (addr, _service) = server::spawn("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let config = config().with_service_url(format!("http://{}{}", addr, server::SEARCH_PATH));

    let (host_end, guest_end) = MemoryChannel::pair();
    let host = Host::new(
        Transport::new(host_end, LinkTiming::from(&config)),
        Box::new(ServiceEngine::new(config.service_url().clone())),
        config.clone(),
    );
    let input = ScriptedInput::new([Starter::Automated], all_cells(), [false]);
    let guest = Guest::new(
        Transport::new(guest_end, LinkTiming::from(&config)),
        Box::new(input),
        &config,
    )
    .unwrap();

    let (host_summary, guest_summary) = tokio::join!(host.run(), guest.run());

    assert_eq!(host_summary.unwrap().outcomes(), vec![Outcome::Won(Mark::X)]);
    assert!(guest_summary.is_ok());
}

#[tokio::test]
async fn test_service_engine_reports_unreachable_service() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let engine = ServiceEngine::new(format!("http://{}{}", addr, server::SEARCH_PATH));
    let result = engine.choose(&Board::new(), Mark::X, Mark::O).await;
    assert!(result.is_err());
}
