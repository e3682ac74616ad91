use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

use super::MidiInEvent;

/// Carries raw MIDI input events from the driver's callback thread onto the
/// UI thread. The receiving side is drained with a bounded read once per
/// frame, so state mutation stays strictly serialized there.
pub struct MessageBus {
    sender: Sender<MidiInEvent>,
    receiver: Receiver<MidiInEvent>,
}

impl MessageBus {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        MessageBus { sender, receiver }
    }

    /// Get a sender that can be cloned into the input callback.
    pub fn sender(&self) -> Sender<MidiInEvent> {
        self.sender.clone()
    }

    /// Non-blocking read of the next queued event.
    pub fn try_receive(&self) -> Result<MidiInEvent, TryRecvError> {
        self.receiver.try_recv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_order() {
        let bus = MessageBus::new();
        let sender = bus.sender();
        for data1 in 0..3 {
            sender.send(MidiInEvent { status: 144, data1, data2: 100 }).unwrap();
        }
        for data1 in 0..3 {
            assert_eq!(bus.try_receive().unwrap().data1, data1);
        }
        assert!(bus.try_receive().is_err());
    }
}
