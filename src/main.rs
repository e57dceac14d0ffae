pub use anyhow::{Result as R, anyhow};
use riffcodex_lib::*;

fn main() -> R<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        print_help(&args[0]);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "raw-chunk-print" => raw_chunk_print(&args[2]),
        "fmt-chunk-print" => fmt_chunk_print(&args[2]),
        "data-chunk-print" => data_chunk_print(&args[2]),
        _ => {
            print_help(&args[0]);
            Ok(())
        }
    }
}

// Prints the fmt chunk as a slice of bytes.
fn raw_chunk_print(path: &str) -> R<()> {
    // Don't register any decoders and load all the data.
    let reg = Registry::shared(ChunkRaw::maker(LOAD_DATA));
    let mut rif = Riff::bare(Some(reg));

    rif.read_file(path)?;

    let Some(ch) = rif.chunks().first(ID_FMT) else {
        return Err(anyhow!("chunk {} not present in the file {}", ID_FMT, path));
    };

    // No chunk decoders were registered so the raw decoder handled it.
    let Some(ch) = ch.as_any().downcast_ref::<ChunkRaw>() else {
        return Err(anyhow!("chunk {} was not decoded by the raw decoder", ID_FMT));
    };

    println!("{:?}", ch.body());

    Ok(())
}

// Prints values defined in the fmt chunk.
fn fmt_chunk_print(path: &str) -> R<()> {
    // Load only metadata.
    let mut rif = Riff::new(SKIP_DATA);

    rif.read_file(path)?;

    // There can be only one fmt chunk in the file; decoding would have
    // errored out on a second one because the chunk is not multi.
    let Some(ch) = rif.chunks().first(ID_FMT) else {
        return Err(anyhow!("chunk {} not present in the file {}", ID_FMT, path));
    };
    let Some(ch) = ch.as_any().downcast_ref::<ChunkFmt>() else {
        return Err(anyhow!("chunk {} was not decoded by the fmt decoder", ID_FMT));
    };

    println!("Chunk fmt");
    println!(" - Compression Code: {:#06x}", ch.comp_code);
    println!(" - Channel Count: {}", ch.channel_cnt);
    println!(" - Sample Rate: {}", ch.sample_rate);
    println!(" - Average Byte Rate: {}", ch.avg_byte_rate);
    println!(" - Block Align: {}", ch.block_align);
    println!(" - Bits Per Sample: {}", ch.bits_per_sample);
    println!(" - Extra fmt Bytes: {:?}", ch.extra());
    println!();

    Ok(())
}

// Prints the first bytes of the data chunk.
fn data_chunk_print(path: &str) -> R<()> {
    let mut rif = Riff::new(LOAD_DATA);

    rif.read_file(path)?;

    let Some(ch) = rif.chunks().first(ID_DATA) else {
        return Err(anyhow!("chunk {} not present in the file {}", ID_DATA, path));
    };
    let Some(ch) = ch.as_any().downcast_ref::<ChunkData>() else {
        return Err(anyhow!(
            "chunk {} was not decoded by the data decoder",
            ID_DATA
        ));
    };

    let head = &ch.data()[..ch.data().len().min(10)];
    println!("first {} bytes of data chunk: {:?}", head.len(), head);

    Ok(())
}

fn print_help(bin: &str) {
    println!(
        "{bin} action
action:
  raw-chunk-print [file]   print fmt chunk as raw bytes
  fmt-chunk-print [file]   print human readable values from fmt chunk
  data-chunk-print [file]  print first few bytes of data chunk"
    );
}
