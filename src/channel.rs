use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use log::debug;

use crate::error::ChannelError;

/// Callback invoked once per engine output line.
pub type LineHook = Box<dyn FnMut(&str) + Send>;

enum Transport {
    Process { child: Child, stdin: ChildStdin },
    Pipe(mpsc::Sender<String>),
}

/// Line-oriented command channel to one engine instance.
///
/// Pure transport: `send` writes one command line, and whatever callback
/// currently occupies the single hook slot receives each output line.
/// Installing a new hook replaces the previous one; a line arriving with no
/// hook installed is dropped. No queuing, no backpressure.
pub struct EngineChannel {
    name: &'static str,
    transport: Mutex<Transport>,
    hook: Arc<Mutex<Option<LineHook>>>,
}

impl EngineChannel {
    /// Launch an engine binary with piped stdio. A dedicated reader thread
    /// forwards every stdout line to the hook slot and exits on EOF.
    pub fn spawn(name: &'static str, program: &Path) -> Result<Self, ChannelError> {
        let mut child = Command::new(program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ChannelError::Spawn { name, source })?;
        let stdin = child.stdin.take().ok_or(ChannelError::Stdio { name })?;
        let stdout = child.stdout.take().ok_or(ChannelError::Stdio { name })?;

        let hook: Arc<Mutex<Option<LineHook>>> = Arc::new(Mutex::new(None));
        let reader_hook = Arc::clone(&hook);
        thread::Builder::new()
            .name(format!("{name}-reader"))
            .spawn(move || {
                let reader = BufReader::new(stdout);
                for line in reader.lines() {
                    let Ok(line) = line else { break };
                    dispatch(name, &reader_hook, line.trim_end());
                }
            })
            .map_err(|source| ChannelError::Spawn { name, source })?;

        Ok(Self {
            name,
            transport: Mutex::new(Transport::Process { child, stdin }),
            hook,
        })
    }

    /// In-memory channel for hosting an engine in-process: commands sent
    /// through the channel are captured by the returned [`PipeHandle`], and
    /// the host injects engine output with [`PipeHandle::feed_line`].
    pub fn pipe(name: &'static str) -> (Self, PipeHandle) {
        let (tx, rx) = mpsc::channel();
        let hook: Arc<Mutex<Option<LineHook>>> = Arc::new(Mutex::new(None));
        let channel = Self {
            name,
            transport: Mutex::new(Transport::Pipe(tx)),
            hook: Arc::clone(&hook),
        };
        (channel, PipeHandle { name, commands: rx, hook })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Write one command line to the engine.
    pub fn send(&self, command: &str) -> Result<(), ChannelError> {
        let mut transport = self.transport.lock().expect("channel transport poisoned");
        match &mut *transport {
            Transport::Process { stdin, .. } => writeln!(stdin, "{command}")
                .and_then(|()| stdin.flush())
                .map_err(|source| ChannelError::Write { name: self.name, source }),
            Transport::Pipe(tx) => tx
                .send(command.to_string())
                .map_err(|_| ChannelError::Closed { name: self.name }),
        }
    }

    pub(crate) fn install_hook(&self, hook: LineHook) {
        *self.hook.lock().expect("line hook slot poisoned") = Some(hook);
    }

    pub(crate) fn clear_hook(&self) {
        *self.hook.lock().expect("line hook slot poisoned") = None;
    }
}

impl Drop for EngineChannel {
    fn drop(&mut self) {
        if let Ok(mut transport) = self.transport.lock() {
            if let Transport::Process { child, .. } = &mut *transport {
                // Normally the engine has already left on `quit`; reap it
                // either way.
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }
}

/// Host side of an in-memory channel: drains the commands the orchestrator
/// sent and injects the engine's output lines.
pub struct PipeHandle {
    name: &'static str,
    commands: mpsc::Receiver<String>,
    hook: Arc<Mutex<Option<LineHook>>>,
}

impl PipeHandle {
    /// Deliver one engine output line to the currently installed hook.
    pub fn feed_line(&self, line: &str) {
        dispatch(self.name, &self.hook, line);
    }

    /// Every command sent since the last drain, in order.
    pub fn drain_commands(&self) -> Vec<String> {
        self.commands.try_iter().collect()
    }
}

fn dispatch(name: &str, hook: &Mutex<Option<LineHook>>, line: &str) {
    let mut slot = hook.lock().expect("line hook slot poisoned");
    match slot.as_mut() {
        Some(hook) => hook(line),
        None => debug!("{name}: no listener, dropping line: {line}"),
    }
}
