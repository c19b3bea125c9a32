// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use tracing::{debug, info};

use super::{AudioError, Command};

/// A mock engine. Doesn't produce any sound, but remembers every command it
/// was sent. Devices named with "fail" in them refuse to start.
#[derive(Clone)]
pub struct Engine {
    name: String,
    started: Arc<AtomicBool>,
    start_attempts: Arc<AtomicUsize>,
    commands: Arc<Mutex<Vec<Command>>>,
}

impl Engine {
    /// Gets the given mock engine.
    pub fn get(name: &str) -> Engine {
        Engine {
            name: name.to_string(),
            started: Arc::new(AtomicBool::new(false)),
            start_attempts: Arc::new(AtomicUsize::new(0)),
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns true once the engine has started.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }

    /// The number of times `start` has been called.
    pub fn start_attempts(&self) -> usize {
        self.start_attempts.load(Ordering::Relaxed)
    }

    /// Every command received so far, oldest first.
    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().clone()
    }

    /// Forgets the recorded commands.
    pub fn clear_commands(&self) {
        self.commands.lock().clear();
    }
}

impl super::Engine for Engine {
    fn start(&mut self) -> Result<(), AudioError> {
        self.start_attempts.fetch_add(1, Ordering::Relaxed);
        if self.name.contains("fail") {
            return Err(AudioError::Device(format!(
                "{} is configured to fail",
                self.name
            )));
        }
        if !self.started.swap(true, Ordering::Relaxed) {
            info!(device = self.name, "Mock engine started");
        }
        Ok(())
    }

    fn send(&self, command: Command) -> Result<(), AudioError> {
        if !self.is_started() {
            return Err(AudioError::NotStarted);
        }
        debug!(device = self.name, command = ?command, "Mock engine command");
        self.commands.lock().push(command);
        Ok(())
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Engine as _;

    #[test]
    fn test_records_commands_after_start() {
        let mut engine = Engine::get("mock");
        assert!(matches!(
            engine.send(Command::Release {
                note: "C4".to_string()
            }),
            Err(AudioError::NotStarted)
        ));

        engine.start().unwrap();
        let observer = engine.clone();
        engine
            .send(Command::Release {
                note: "C4".to_string(),
            })
            .unwrap();
        assert_eq!(
            observer.commands(),
            vec![Command::Release {
                note: "C4".to_string()
            }]
        );
        observer.clear_commands();
        assert!(engine.commands().is_empty());
    }

    #[test]
    fn test_failing_device() {
        let mut engine = Engine::get("mock-fail");
        assert!(engine.start().is_err());
        assert!(engine.start().is_err());
        assert_eq!(engine.start_attempts(), 2);
        assert!(!engine.is_started());
    }
}
