use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use crate::channel::EngineChannel;
use crate::config::{default_zero_go, Config, SearchOpts};
use crate::error::Error;
use crate::pending::Pending;
use crate::uci::{self, MultiPvCollector, RankedVariations};

/// Facade over the zero (neural) and fish (classical) engine pair.
///
/// One request may be in flight per engine at a time; starting a second one
/// fails with [`Error::Busy`] rather than silently stealing the first
/// caller's listener. The facade moves through four states: uninitialized
/// (no net; `go_zero` fails), ready (after `set_net`), stopped-idle (after
/// `stop`), terminated (after `quit`; further use is undefined).
pub struct Zerofish {
    zero: EngineChannel,
    fish: EngineChannel,
    zero_busy: Arc<AtomicBool>,
    fish_busy: Arc<AtomicBool>,
    net_name: Mutex<Option<String>>,
    search: Mutex<SearchOpts>,
    zero_go: String,
    weights_dir: PathBuf,
}

impl Zerofish {
    /// Spawn both engine processes and apply the startup configuration,
    /// including the optional initial network weights.
    pub fn launch(config: &Config) -> Result<Self, Error> {
        let zero = EngineChannel::spawn("zero", &config.engines.zero)?;
        let fish = EngineChannel::spawn("fish", &config.engines.fish)?;
        let mut zf = Self::with_channels(zero, fish);
        zf.zero_go = config.zero_go.clone();
        if let Some(dir) = &config.weights_dir {
            zf.weights_dir = dir.clone();
        }
        zf.set_search(config.search);
        if let Some(net) = &config.net {
            let weights = fs::read(&net.path)
                .map_err(|source| Error::Weights { path: net.path.clone(), source })?;
            zf.set_net(&net.name, &weights)?;
        }
        Ok(zf)
    }

    /// Wrap existing channels. The engines behind them are expected to
    /// already speak the line protocol; no handshake is performed.
    pub fn with_channels(zero: EngineChannel, fish: EngineChannel) -> Self {
        Self {
            zero,
            fish,
            zero_busy: Arc::new(AtomicBool::new(false)),
            fish_busy: Arc::new(AtomicBool::new(false)),
            net_name: Mutex::new(None),
            search: Mutex::new(SearchOpts::default()),
            zero_go: default_zero_go(),
            weights_dir: std::env::temp_dir(),
        }
    }

    /// Override the search command `go_zero` sends. The default single-node
    /// lookup stands in until the zero nets get a real search.
    pub fn set_zero_go(&mut self, command: impl Into<String>) {
        self.zero_go = command.into();
    }

    /// Name of the currently loaded network, if any.
    pub fn net_name(&self) -> Option<String> {
        self.net_name.lock().expect("net name poisoned").clone()
    }

    /// Hand weight bytes to the zero engine and record the identity,
    /// enabling `go_zero`. Bytes are spooled to the weights directory and
    /// the path is passed via `setoption`.
    pub fn set_net(&self, name: &str, weights: &[u8]) -> Result<(), Error> {
        let path = self.weights_dir.join(format!("zerofish-{name}.weights"));
        fs::write(&path, weights)
            .map_err(|source| Error::Weights { path: path.clone(), source })?;
        self.zero
            .send(&format!("setoption name WeightsFile value {}", path.display()))?;
        *self.net_name.lock().expect("net name poisoned") = Some(name.to_string());
        Ok(())
    }

    /// Replace the stored default search configuration.
    pub fn set_search(&self, opts: SearchOpts) {
        *self.search.lock().expect("search opts poisoned") = opts;
    }

    /// Ask the zero engine for a best move at the given position.
    pub fn go_zero(&self, fen: &str) -> Result<Pending<String>, Error> {
        if self.net_name.lock().expect("net name poisoned").is_none() {
            return Err(Error::UninitializedNet);
        }
        if self.zero_busy.swap(true, Ordering::AcqRel) {
            return Err(Error::Busy { engine: self.zero.name() });
        }

        let (tx, rx) = mpsc::channel();
        let mut tx = Some(tx);
        let busy = Arc::clone(&self.zero_busy);
        self.zero.install_hook(Box::new(move |line| {
            if let Some(mv) = uci::parse_bestmove(line) {
                busy.store(false, Ordering::Release);
                if let Some(tx) = tx.take() {
                    let _ = tx.send(mv);
                }
            }
        }));

        let sent = self
            .zero
            .send(&format!("position fen {fen}"))
            .and_then(|()| self.zero.send(&self.zero_go));
        if let Err(err) = sent {
            self.zero.clear_hook();
            self.zero_busy.store(false, Ordering::Release);
            return Err(err.into());
        }
        Ok(Pending::new(self.zero.name(), rx))
    }

    /// Ask the fish engine for ranked variations at the given position,
    /// using `opts` or the stored default.
    pub fn go_fish(
        &self,
        fen: &str,
        opts: Option<SearchOpts>,
    ) -> Result<Pending<RankedVariations>, Error> {
        let opts = opts.unwrap_or_else(|| *self.search.lock().expect("search opts poisoned"));
        if self.fish_busy.swap(true, Ordering::AcqRel) {
            return Err(Error::Busy { engine: self.fish.name() });
        }

        let pvs = opts.pvs.max(1);
        let mut collector = MultiPvCollector::new(pvs);
        let (tx, rx) = mpsc::channel();
        let mut tx = Some(tx);
        let busy = Arc::clone(&self.fish_busy);
        self.fish.install_hook(Box::new(move |line| {
            if let Some(ranks) = collector.feed(line) {
                busy.store(false, Ordering::Release);
                if let Some(tx) = tx.take() {
                    let _ = tx.send(ranks);
                }
            }
        }));

        if let Err(err) = self.send_fish_go(fen, pvs, &opts) {
            self.fish.clear_hook();
            self.fish_busy.store(false, Ordering::Release);
            return Err(err);
        }
        Ok(Pending::new(self.fish.name(), rx))
    }

    fn send_fish_go(&self, fen: &str, pvs: u32, opts: &SearchOpts) -> Result<(), Error> {
        self.fish.send(&format!("setoption name multipv value {pvs}"))?;
        self.fish.send(&format!("position fen {fen}"))?;
        match opts.movetime_ms {
            Some(ms) => self.fish.send(&format!("go movetime {ms}"))?,
            None => self.fish.send(&format!("go depth {}", opts.depth))?,
        }
        Ok(())
    }

    /// Interrupt any running search. A pending result is not resolved here;
    /// the engine's own final `bestmove` in response to the stop does that.
    pub fn stop(&self) -> Result<(), Error> {
        if self.net_name.lock().expect("net name poisoned").is_some() {
            self.zero.send("stop")?;
        }
        self.fish.send("stop")?;
        Ok(())
    }

    /// Stop both engines and begin a new game on each.
    pub fn reset(&self) -> Result<(), Error> {
        self.stop()?;
        self.fish.send("ucinewgame")?;
        if self.net_name.lock().expect("net name poisoned").is_some() {
            self.zero.send("ucinewgame")?;
        }
        Ok(())
    }

    /// Stop and terminate both engines. The facade is unusable afterwards.
    pub fn quit(&self) -> Result<(), Error> {
        self.stop()?;
        self.zero.send("quit")?;
        self.fish.send("quit")?;
        Ok(())
    }

    /// Raw passthrough to the zero engine.
    pub fn send_zero(&self, command: &str) -> Result<(), Error> {
        Ok(self.zero.send(command)?)
    }

    /// Raw passthrough to the fish engine.
    pub fn send_fish(&self, command: &str) -> Result<(), Error> {
        Ok(self.fish.send(command)?)
    }
}
