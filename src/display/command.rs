//! ST7735 command set.
//!
//! Read commands (RDDID, RDDST, RAMRD, RDIDx) are not listed; the panel is
//! never read back.

/// Controller command byte
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SoftwareReset = 0x01,        // SWRESET
    SleepOut = 0x11,             // SLPOUT, booster on
    NormalMode = 0x13,           // NORON
    InversionOff = 0x20,         // INVOFF
    InversionOn = 0x21,          // INVON
    DisplayOff = 0x28,           // DISPOFF
    DisplayOn = 0x29,            // DISPON
    ColumnAddressSet = 0x2A,     // CASET
    RowAddressSet = 0x2B,        // RASET
    MemoryWrite = 0x2C,          // RAMWR
    MemoryAccessControl = 0x36,  // MADCTL
    PixelFormat = 0x3A,          // COLMOD
    FrameRateNormal = 0xB1,      // FRMCTR1, full colors
    FrameRateIdle = 0xB2,        // FRMCTR2, 8 colors
    FrameRatePartial = 0xB3,     // FRMCTR3, partial + full colors
    InversionControl = 0xB4,     // INVCTR
    PowerControl1 = 0xC0,        // PWCTR1
    PowerControl2 = 0xC1,        // PWCTR2
    PowerControl3 = 0xC2,        // PWCTR3
    PowerControl4 = 0xC3,        // PWCTR4
    PowerControl5 = 0xC4,        // PWCTR5
    VcomControl = 0xC5,          // VMCTR1
    GammaPositive = 0xE0,        // GMCTRP1
    GammaNegative = 0xE1,        // GMCTRN1
}

impl From<Command> for u8 {
    fn from(command: Command) -> u8 {
        command as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_bytes_match_datasheet() {
        assert_eq!(u8::from(Command::SoftwareReset), 0x01);
        assert_eq!(u8::from(Command::ColumnAddressSet), 0x2A);
        assert_eq!(u8::from(Command::RowAddressSet), 0x2B);
        assert_eq!(u8::from(Command::MemoryWrite), 0x2C);
        assert_eq!(u8::from(Command::MemoryAccessControl), 0x36);
        assert_eq!(u8::from(Command::GammaNegative), 0xE1);
    }
}
