pub mod command;
pub mod environment;
pub mod flight_state;
pub mod guidance;
pub mod mission;
pub mod propulsion;
pub mod rocket;
pub mod vehicle;
