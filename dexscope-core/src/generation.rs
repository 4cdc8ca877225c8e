/// Request generation counter. Each fetch takes a ticket and its result is applied
/// only while that ticket is still the latest one issued.
#[derive(Debug, Default)]
pub struct Generation {
    current: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Ticket {
        self.current = self.current.wrapping_add(1);
        Ticket(self.current)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }

    /// Retires every outstanding ticket without starting a new request.
    pub fn invalidate(&mut self) {
        self.current = self.current.wrapping_add(1);
    }
}
