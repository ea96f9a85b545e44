/// A request raised by the UI and executed by the viewer on the event-loop
/// thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerCommand {
    /// Cross-fade to the clip with this name.
    ChangeAnimation(String),
}

/// Multi-producer queue of [`ViewerCommand`]s, drained once per frame.
///
/// Producers hold a cloned [`flume::Sender`]; only the viewer drains, so
/// commands run one at a time in submission order.
pub struct CommandQueue {
    sender: flume::Sender<ViewerCommand>,
    receiver: flume::Receiver<ViewerCommand>,
}

impl CommandQueue {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    #[must_use]
    pub fn sender(&self) -> flume::Sender<ViewerCommand> {
        self.sender.clone()
    }

    pub fn push(&self, command: ViewerCommand) {
        // Cannot fail: the queue owns a receiver.
        let _ = self.sender.send(command);
    }

    pub fn drain(&self) -> Vec<ViewerCommand> {
        self.receiver.try_iter().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
