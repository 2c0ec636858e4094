pub mod user;
pub mod showtime;
pub mod seat;
pub mod booking;

pub use user::Principal;
pub use showtime::{Movie, Showtime, Theatre};
pub use seat::{Row, Seat, SeatId, SeatStatus};
pub use booking::{Booking, PaymentStatus, Ticket};
