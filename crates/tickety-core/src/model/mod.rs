pub mod ticket;

pub use ticket::{NewTicket, ParseEnumError, Priority, Status, Ticket, TicketPatch};
