mod sink;

pub use sink::KiraToneSink;
