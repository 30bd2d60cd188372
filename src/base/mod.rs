mod chunk;

pub use self::chunk::Chunk;
