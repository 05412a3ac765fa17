//! Command dispatcher: replays the controller side of the USB handshake.

use procon_proto::reply::{self, ack};
use procon_proto::{
    parse, CalibrationStore, Command, EncodeError, Handshake, ResponseFrame, Subcommand,
};

/// Dispatcher state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatcherState {
    /// Waiting for the host's handshake.
    Init,
    /// Handshake answered, standard reports not yet enabled.
    HandshakeAcked,
    /// Standard reports enabled.
    Streaming,
}

/// Reply to an SPI read of an address the store does not hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnknownAddressPolicy {
    /// Send nothing; the host retries or gives up.
    #[default]
    Silent,
    /// Send a reply with ack `0x00` and no data.
    Nack,
}

/// Turns inbound command frames into response frames.
pub struct CommandDispatcher {
    state: DispatcherState,
    store: CalibrationStore,
    policy: UnknownAddressPolicy,
}

impl CommandDispatcher {
    #[must_use]
    pub const fn new(store: CalibrationStore, policy: UnknownAddressPolicy) -> Self {
        Self {
            state: DispatcherState::Init,
            store,
            policy,
        }
    }

    #[must_use]
    pub const fn state(&self) -> DispatcherState {
        self.state
    }

    /// Whether standard reports are enabled.
    #[inline]
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.state == DispatcherState::Streaming
    }

    /// Back to [`DispatcherState::Init`], e.g. after a disconnect.
    pub fn reset(&mut self) {
        if self.state != DispatcherState::Init {
            info!("dispatcher reset");
        }
        self.state = DispatcherState::Init;
    }

    /// Handle one inbound frame.
    ///
    /// `counter` is the current rolling counter, carried by subcommand
    /// replies. Frames that fail to parse, unknown commands and, under
    /// [`UnknownAddressPolicy::Silent`], unknown SPI addresses produce no
    /// response.
    pub fn handle_command(&mut self, frame: &[u8], counter: u8) -> Option<ResponseFrame> {
        let command = match parse(frame) {
            Ok(command) => command,
            Err(e) => {
                warn!("dropping frame: {:?}", e);
                return None;
            }
        };
        trace!("command {:?}", command);

        match self.dispatch(command, counter) {
            Ok(response) => response,
            Err(e) => {
                error!("reply encoding failed: {:?}", e);
                None
            }
        }
    }

    fn dispatch(
        &mut self,
        command: Command,
        counter: u8,
    ) -> Result<Option<ResponseFrame>, EncodeError> {
        match command {
            Command::Handshake(step) => self.handshake(step),
            Command::Subcommand(subcommand) => self.subcommand(subcommand, counter),
            Command::Rumble => Ok(None),
        }
    }

    fn handshake(&mut self, step: Handshake) -> Result<Option<ResponseFrame>, EncodeError> {
        let response = match step {
            Handshake::Status => reply::handshake_reply(0x01, &reply::STATUS_PAYLOAD)?,
            Handshake::Handshake => {
                if self.state == DispatcherState::Init {
                    info!("handshake acknowledged");
                    self.state = DispatcherState::HandshakeAcked;
                }
                reply::handshake_reply(0x02, &[0x00])?
            }
            Handshake::HighSpeed => reply::handshake_reply(0x03, &[0x00])?,
            Handshake::ForceUsb => {
                if self.state != DispatcherState::Streaming {
                    info!("streaming enabled");
                }
                self.state = DispatcherState::Streaming;
                return Ok(None);
            }
            Handshake::Unknown(step) => {
                warn!("unknown handshake step {:#x}", step);
                return Ok(None);
            }
        };
        Ok(Some(response))
    }

    fn subcommand(
        &mut self,
        subcommand: Subcommand,
        counter: u8,
    ) -> Result<Option<ResponseFrame>, EncodeError> {
        let id = subcommand.id();
        let response = match subcommand {
            Subcommand::Pairing => {
                reply::subcommand_reply(counter, ack::PAIRING, id, &reply::PAIRING_PAYLOAD)?
            }
            Subcommand::DeviceInfo => {
                reply::subcommand_reply(counter, ack::DEVICE_INFO, id, &reply::DEVICE_INFO)?
            }
            Subcommand::SetInputMode
            | Subcommand::SetShipmentMode
            | Subcommand::SetPlayerLights
            | Subcommand::SetHomeLight
            | Subcommand::EnableImu
            | Subcommand::EnableVibration => {
                reply::subcommand_reply(counter, ack::OK, id, &[])?
            }
            Subcommand::TriggerElapsed => {
                reply::subcommand_reply(counter, ack::TRIGGER_ELAPSED, id, &[])?
            }
            Subcommand::SetNfcIrConfig => {
                reply::subcommand_reply(counter, ack::NFC_IR, id, &reply::NFC_IR_CONFIG)?
            }
            Subcommand::SpiRead { address, length } => {
                return self.spi_read(address, length, counter);
            }
            Subcommand::Unknown(id) => {
                warn!("unknown subcommand {:#x}", id);
                return Ok(None);
            }
        };
        Ok(Some(response))
    }

    fn spi_read(
        &self,
        address: u16,
        length: Option<u8>,
        counter: u8,
    ) -> Result<Option<ResponseFrame>, EncodeError> {
        match self.store.lookup(address) {
            Some(blob) => {
                if let Some(requested) = length.filter(|&len| len != blob.len()) {
                    debug!(
                        "spi read {:#x}: host asked for {} bytes, serving {}",
                        address,
                        requested,
                        blob.len()
                    );
                }
                reply::spi_read_reply(counter, blob).map(Some)
            }
            None => {
                warn!("spi read of unknown address {:#x}", address);
                match self.policy {
                    UnknownAddressPolicy::Silent => Ok(None),
                    UnknownAddressPolicy::Nack => reply::spi_read_nack(counter, address).map(Some),
                }
            }
        }
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new(CalibrationStore::DEFAULT, UnknownAddressPolicy::Silent)
    }
}
