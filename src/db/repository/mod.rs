pub mod event;
pub mod schedule;

pub use event::EventRepository;
pub use schedule::ScheduleRepository;
