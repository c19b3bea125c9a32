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

use thread_priority::{set_current_thread_priority, ThreadPriority, ThreadPriorityValue};
use tracing::{info, warn};

/// Priority for the audio callback thread when SINFONIA_THREAD_PRIORITY is unset.
const DEFAULT_CALLBACK_THREAD_PRIORITY: u8 = 70;

/// Settings for the callback thread, read from the environment once when the
/// stream is built so the callback itself never touches the environment.
#[derive(Debug, Clone, Copy)]
pub struct CallbackPriority {
    priority: Option<ThreadPriorityValue>,
    rt_audio: bool,
    applied: bool,
}

impl CallbackPriority {
    pub fn from_env() -> CallbackPriority {
        CallbackPriority {
            priority: callback_thread_priority(),
            rt_audio: rt_audio_enabled(),
            applied: false,
        }
    }

    /// Raises the priority of the calling thread. Only the first call does anything.
    pub fn apply(&mut self) {
        if self.applied {
            return;
        }
        self.applied = true;

        let Some(priority) = self.priority else {
            return;
        };
        let tp = ThreadPriority::Crossplatform(priority);
        let _ = set_current_thread_priority(tp);

        #[cfg(unix)]
        if self.rt_audio {
            use thread_priority::unix::{
                set_thread_priority_and_policy, thread_native_id, RealtimeThreadSchedulePolicy,
                ThreadSchedulePolicy,
            };
            match set_thread_priority_and_policy(
                thread_native_id(),
                tp,
                ThreadSchedulePolicy::Realtime(RealtimeThreadSchedulePolicy::Fifo),
            ) {
                Ok(()) => info!("Enabled RT SCHED_FIFO for audio callback thread"),
                Err(e) => warn!(
                    error = %e,
                    "Failed to set RT SCHED_FIFO for audio callback thread"
                ),
            }
        }
    }
}

/// Reads SINFONIA_THREAD_PRIORITY (0-99), falling back to the default.
fn callback_thread_priority() -> Option<ThreadPriorityValue> {
    parse_priority(std::env::var("SINFONIA_THREAD_PRIORITY").ok().as_deref())
}

fn parse_priority(value: Option<&str>) -> Option<ThreadPriorityValue> {
    value
        .and_then(|v| v.parse::<u8>().ok())
        .filter(|n| *n < 100)
        .and_then(|n| ThreadPriorityValue::try_from(n).ok())
        .or_else(|| ThreadPriorityValue::try_from(DEFAULT_CALLBACK_THREAD_PRIORITY).ok())
}

fn flag_set(value: Option<&str>) -> bool {
    value
        .map(|v| {
            v == "1"
                || v.eq_ignore_ascii_case("true")
                || v.eq_ignore_ascii_case("yes")
                || v.eq_ignore_ascii_case("on")
        })
        .unwrap_or(false)
}

/// RT (SCHED_FIFO) scheduling is on unless SINFONIA_DISABLE_RT_AUDIO is set.
fn rt_audio_enabled() -> bool {
    !flag_set(std::env::var("SINFONIA_DISABLE_RT_AUDIO").ok().as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_priority() {
        let default = ThreadPriorityValue::try_from(DEFAULT_CALLBACK_THREAD_PRIORITY).ok();
        assert_eq!(parse_priority(None), default);
        assert_eq!(parse_priority(Some("abc")), default);
        assert_eq!(parse_priority(Some("150")), default);
        assert_eq!(
            parse_priority(Some("42")),
            ThreadPriorityValue::try_from(42u8).ok()
        );
    }

    #[test]
    fn test_flag_set() {
        assert!(flag_set(Some("1")));
        assert!(flag_set(Some("TRUE")));
        assert!(flag_set(Some("on")));
        assert!(!flag_set(Some("0")));
        assert!(!flag_set(None));
    }
}
