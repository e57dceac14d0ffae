pub use crate::dprintln; // Make the macro available
pub use crate::*;
pub use anyhow::{Context, Result as R, anyhow};
pub use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

pub use std::io::{Cursor, Read, Seek, SeekFrom, Write};
