pub mod client;
pub mod server;
pub mod stream;

pub use client::{read_input_line, render_table, SfeClient};
pub use server::{run_session, SfeServer};
pub use stream::{MessageReader, MessageWriter};
