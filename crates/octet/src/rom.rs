use anyhow::{ensure, Context, Result};
use octet_chip8::PROGRAM_CAPACITY;
use std::path::Path;

/// Reads a ROM image from disk.
pub fn read_rom(path: &Path) -> Result<Vec<u8>> {
    log::info!("Loading ROM '{}'", path.display());
    let rom = std::fs::read(path).with_context(|| format!("failed to read ROM '{}'", path.display()))?;
    ensure!(
        rom.len() <= PROGRAM_CAPACITY,
        "ROM '{}' is {} bytes, more than the {} bytes of program memory",
        path.display(),
        rom.len(),
        PROGRAM_CAPACITY
    );
    log::info!("ROM size: {} bytes", rom.len());
    Ok(rom)
}

/// Built-in program played when no ROM is given: writes the sixteen hex
/// digits across the top of the screen, beeps, waits about a second at the
/// default rate and stops.
pub fn demo_rom() -> Vec<u8> {
    const PROGRAM: [u16; 16] = [
        0x6000, // 200: V0 = 0        digit
        0x6100, // 202: V1 = 0        x
        0x6201, // 204: V2 = 1        y
        0xF029, // 206: I = glyph V0
        0xD125, // 208: draw at (V1, V2)
        0x7001, // 20A: V0 += 1
        0x7104, // 20C: V1 += 4
        0x3010, // 20E: skip if V0 == 16
        0x1206, // 210: next digit
        0x6A3C, // 212: VA = 60
        0xFA15, // 214: DT = VA
        0xFA18, // 216: ST = VA
        0xFB07, // 218: VB = DT
        0x3B00, // 21A: skip if VB == 0
        0x1218, // 21C: wait
        0x5000, // 21E: stop
    ];
    PROGRAM.iter().flat_map(|word| word.to_be_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rom_is_an_error() {
        let err = read_rom(Path::new("definitely/not/here.ch8")).unwrap_err();
        assert!(err.to_string().contains("failed to read ROM"));
    }

    #[test]
    fn reads_rom_from_disk() {
        let path = std::env::temp_dir().join(format!("octet-rom-{}.ch8", std::process::id()));
        std::fs::write(&path, [0x00, 0xE0, 0x12, 0x00]).unwrap();
        let rom = read_rom(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(rom, vec![0x00, 0xE0, 0x12, 0x00]);
    }

    #[test]
    fn oversized_rom_is_an_error() {
        let path = std::env::temp_dir().join(format!("octet-big-{}.ch8", std::process::id()));
        std::fs::write(&path, vec![0u8; PROGRAM_CAPACITY + 1]).unwrap();
        let result = read_rom(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn demo_starts_with_digit_loop() {
        let rom = demo_rom();
        assert_eq!(rom.len(), 32);
        assert_eq!(&rom[..4], &[0x60, 0x00, 0x61, 0x00]);
    }
}
