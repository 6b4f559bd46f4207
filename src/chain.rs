use tracing::{debug, trace};

use crate::{
    channel::{GateChannel, GateState, Mode},
    switches::ChannelId,
};

/// Both channels of the module.
///
/// Chained channels play as one sequence of `len(A) + len(B)` steps. There is no
/// combined counter: the leading channel plays, pushes its gate to the follower,
/// and hands the lead over when its own cycle wraps.
#[derive(Debug, Clone)]
pub struct ChainCoordinator {
    channels: [GateChannel; 2],
    chained: bool,
}

impl ChainCoordinator {
    pub fn new(length: u8) -> Self {
        Self {
            channels: [GateChannel::new(length), GateChannel::new(length)],
            chained: false,
        }
    }

    pub fn channel(&self, id: ChannelId) -> &GateChannel {
        &self.channels[id.index()]
    }

    pub fn channel_mut(&mut self, id: ChannelId) -> &mut GateChannel {
        &mut self.channels[id.index()]
    }

    pub fn is_chained(&self) -> bool {
        self.chained
    }

    pub fn output(&self, id: ChannelId) -> bool {
        self.channel(id).is_on()
    }

    pub fn outputs(&self) -> [bool; 2] {
        [self.channels[0].is_on(), self.channels[1].is_on()]
    }

    pub fn leader(&self) -> Option<ChannelId> {
        ChannelId::ALL
            .into_iter()
            .find(|&id| self.channel(id).state().is_leading())
    }

    pub fn set_mode(&mut self, id: ChannelId, mode: Mode) {
        let channel = self.channel_mut(id);
        if channel.mode() != mode {
            channel.set_mode(mode);
            debug!("channel {} -> {}", id.label(), channel.state().name());
        }
    }

    pub fn set_chained(&mut self, chained: bool) {
        if chained != self.chained {
            debug!("chain {}", if chained { "on" } else { "off" });
        }

        self.chained = chained;
        self.assign_roles();
    }

    pub fn rise(&mut self) {
        match self.leader() {
            Some(leader) => {
                let handoff = self.channel_mut(leader).rise();
                self.push(leader);

                if handoff {
                    self.hand_off(leader);
                }
            }
            None => {
                for channel in self.channels.iter_mut() {
                    channel.rise();
                }
            }
        }

        trace!("rise {:?}", self.outputs());
    }

    pub fn fall(&mut self) {
        match self.leader() {
            Some(leader) => {
                self.channel_mut(leader).fall();
                self.push(leader);
            }
            None => {
                for channel in self.channels.iter_mut() {
                    channel.fall();
                }
            }
        }

        trace!("fall {:?}", self.outputs());
    }

    /// Rewind both channels. A chain always restarts from channel A.
    pub fn reset(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.reset();
        }

        if self.chained {
            self.set_roles(ChannelId::A);
        }
    }

    // Makes sure a chain has exactly one leader and standalone channels have none.
    fn assign_roles(&mut self) {
        if !self.chained {
            for channel in self.channels.iter_mut() {
                let mode = channel.mode();
                channel.set_state(GateState::Standalone(mode));
            }
            return;
        }

        match self.leader() {
            Some(leader) => {
                let follower = self.channel_mut(leader.other());
                if !follower.state().is_following() {
                    let mode = follower.mode();
                    follower.set_state(GateState::Following(mode));
                }
            }
            None => self.set_roles(ChannelId::A),
        }
    }

    fn set_roles(&mut self, leader: ChannelId) {
        let mode = self.channel(leader).mode();
        self.channel_mut(leader).set_state(GateState::Leading(mode));

        let mode = self.channel(leader.other()).mode();
        self.channel_mut(leader.other())
            .set_state(GateState::Following(mode));

        debug!("channel {} leads", leader.label());
    }

    fn push(&mut self, leader: ChannelId) {
        let on = self.channel(leader).is_on();
        self.channel_mut(leader.other()).follow(on);
    }

    fn hand_off(&mut self, leader: ChannelId) {
        trace!("channel {} hands over", leader.label());
        self.set_roles(leader.other());
    }
}
