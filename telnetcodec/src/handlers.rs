//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Replies to received `WILL`, `WONT`, `DO` and `DONT`.
//!
//! A request we did not ask for is refused, and the refusal is sent at most once per option and
//! direction: recording our own `DONT` or `WONT` can only succeed once, and nothing is sent when
//! it fails. Handlers never send `WILL` or `DO`; enabling an option always starts from the
//! negotiation table.

use crate::{Intent, TelnetFrame, TelnetOption, TelnetSession, Verb};
use tracing::{debug, trace};

/// What handling one command decided.
enum Outcome {
    /// The peer answered a request of ours.
    Accepted,
    /// Send this refusal.
    Refuse(TelnetFrame),
    /// Nothing to do.
    Recorded,
}

impl TelnetSession {
    /// Apply a received negotiation command.
    pub(crate) fn handle_negotiation(&mut self, verb: Verb, option: TelnetOption) {
        let behavior = self.behavior();
        if option.is_client_reported() && !behavior.acts_on(verb) {
            self.note_role_violation(option);
            return;
        }

        if !option.is_tracked() {
            self.handle_untracked(verb, option);
            return;
        }
        let Some(state) = self.option_mut(option) else {
            return;
        };

        let outcome = match verb {
            Verb::Will => {
                state.set_peer_offer(Intent::Enable);
                if state.sent_do() {
                    Outcome::Accepted
                } else if state.set_request(Intent::Disable) {
                    Outcome::Refuse(TelnetFrame::Dont(option))
                } else {
                    Outcome::Recorded
                }
            }
            Verb::Wont => {
                state.set_peer_offer(Intent::Disable);
                if state.set_request(Intent::Disable) {
                    Outcome::Refuse(TelnetFrame::Dont(option))
                } else {
                    Outcome::Recorded
                }
            }
            Verb::Do => {
                state.set_peer_request(Intent::Enable);
                if state.sent_will() {
                    Outcome::Accepted
                } else if state.set_offer(Intent::Disable) {
                    Outcome::Refuse(TelnetFrame::Wont(option))
                } else {
                    Outcome::Recorded
                }
            }
            Verb::Dont => {
                state.set_peer_request(Intent::Disable);
                if state.set_offer(Intent::Disable) {
                    Outcome::Refuse(TelnetFrame::Wont(option))
                } else {
                    Outcome::Recorded
                }
            }
        };

        match outcome {
            Outcome::Accepted => {
                debug!(option = %option, verb = %verb, "peer accepted");
                match verb {
                    Verb::Will => behavior.peer_will_accepted(self, option),
                    Verb::Do => behavior.peer_do_accepted(self, option),
                    Verb::Wont | Verb::Dont => {}
                }
            }
            Outcome::Refuse(reply) => {
                debug!(option = %option, verb = %verb, reply = %reply, "refusing");
                self.queue_reply(reply);
            }
            Outcome::Recorded => {
                trace!(option = %option, verb = %verb, "recorded");
            }
        }
    }

    fn handle_untracked(&mut self, verb: Verb, option: TelnetOption) {
        let code = option.to_u8();
        let reply = match verb {
            Verb::Will if self.options_mut().refuse_offer(code) => TelnetFrame::Dont(option),
            Verb::Do if self.options_mut().refuse_request(code) => TelnetFrame::Wont(option),
            _ => {
                trace!(option = %option, verb = %verb, "ignoring untracked option");
                return;
            }
        };
        debug!(option = %option, verb = %verb, "refusing untracked option");
        self.queue_reply(reply);
    }
}
