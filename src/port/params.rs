//! Line parameters: baud rate, character size, parity, stop bits and flow
//! control.
//!
//! Each parameter is a closed enum, so a value that reaches the device layer
//! is always valid. Conversions from raw numbers and strings are where
//! out-of-range input is rejected, with `InvalidArgument` (or
//! `UnsupportedBaudRate` for speeds).

use super::error::PortError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! baud_rates {
    (
        standard { $( $variant:ident => $bps:literal; )+ }
        high_speed { $( $high:ident => $high_bps:literal; )+ }
    ) => {
        /// Standard line speeds understood by the terminal driver.
        ///
        /// Variant names match the `libc` speed constants they map to.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u32", into = "u32")]
        pub enum BaudRate {
            $( $variant, )+
            $( #[cfg(any(target_os = "linux", target_os = "android"))] $high, )+
        }

        impl BaudRate {
            /// Every rate this platform supports, slowest first.
            #[cfg(any(target_os = "linux", target_os = "android"))]
            pub const ALL: &'static [BaudRate] = &[
                $( BaudRate::$variant, )+
                $( BaudRate::$high, )+
            ];

            /// Every rate this platform supports, slowest first.
            #[cfg(not(any(target_os = "linux", target_os = "android")))]
            pub const ALL: &'static [BaudRate] = &[ $( BaudRate::$variant, )+ ];

            /// The rate in bits per second.
            pub fn bits_per_second(self) -> u32 {
                match self {
                    $( BaudRate::$variant => $bps, )+
                    $(
                        #[cfg(any(target_os = "linux", target_os = "android"))]
                        BaudRate::$high => $high_bps,
                    )+
                }
            }

            pub(crate) fn speed(self) -> libc::speed_t {
                match self {
                    $( BaudRate::$variant => libc::$variant, )+
                    $(
                        #[cfg(any(target_os = "linux", target_os = "android"))]
                        BaudRate::$high => libc::$high,
                    )+
                }
            }

            pub(crate) fn from_speed(speed: libc::speed_t) -> Option<Self> {
                match speed {
                    $( s if s == libc::$variant => Some(BaudRate::$variant), )+
                    $(
                        #[cfg(any(target_os = "linux", target_os = "android"))]
                        s if s == libc::$high => Some(BaudRate::$high),
                    )+
                    _ => None,
                }
            }
        }

        impl TryFrom<u32> for BaudRate {
            type Error = PortError;

            fn try_from(bps: u32) -> Result<Self, Self::Error> {
                match bps {
                    $( $bps => Ok(BaudRate::$variant), )+
                    $(
                        #[cfg(any(target_os = "linux", target_os = "android"))]
                        $high_bps => Ok(BaudRate::$high),
                    )+
                    other => Err(PortError::unsupported_baud(format!("{} bps", other))),
                }
            }
        }
    };
}

baud_rates! {
    standard {
        B50 => 50;
        B75 => 75;
        B110 => 110;
        B134 => 134;
        B150 => 150;
        B200 => 200;
        B300 => 300;
        B600 => 600;
        B1200 => 1200;
        B1800 => 1800;
        B2400 => 2400;
        B4800 => 4800;
        B9600 => 9600;
        B19200 => 19200;
        B38400 => 38400;
        B57600 => 57600;
        B115200 => 115200;
        B230400 => 230400;
    }
    high_speed {
        B460800 => 460800;
        B921600 => 921600;
    }
}

impl From<BaudRate> for u32 {
    fn from(rate: BaudRate) -> Self {
        rate.bits_per_second()
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        Self::B9600
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits_per_second())
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CharSize {
    Five,
    Six,
    Seven,
    Eight,
}

impl CharSize {
    pub const ALL: [CharSize; 4] = [Self::Five, Self::Six, Self::Seven, Self::Eight];

    /// The `CSIZE` field value for this size.
    pub(crate) fn flag(self) -> libc::tcflag_t {
        match self {
            Self::Five => libc::CS5,
            Self::Six => libc::CS6,
            Self::Seven => libc::CS7,
            Self::Eight => libc::CS8,
        }
    }

    pub(crate) fn from_flag(flag: libc::tcflag_t) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.flag() == flag)
    }
}

impl TryFrom<u8> for CharSize {
    type Error = PortError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            5 => Ok(Self::Five),
            6 => Ok(Self::Six),
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            other => Err(PortError::invalid_argument(format!(
                "Invalid character size: {} (expected 5 to 8)",
                other
            ))),
        }
    }
}

impl From<CharSize> for u8 {
    fn from(size: CharSize) -> Self {
        match size {
            CharSize::Five => 5,
            CharSize::Six => 6,
            CharSize::Seven => 7,
            CharSize::Eight => 8,
        }
    }
}

impl Default for CharSize {
    fn default() -> Self {
        Self::Eight
    }
}

impl fmt::Display for CharSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Parity checking modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl Parity {
    pub const ALL: [Parity; 3] = [Self::None, Self::Odd, Self::Even];
}

impl FromStr for Parity {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "n" => Ok(Self::None),
            "odd" | "o" => Ok(Self::Odd),
            "even" | "e" => Ok(Self::Even),
            _ => Err(PortError::invalid_argument(format!(
                "Invalid parity setting: {:?}",
                s
            ))),
        }
    }
}

impl Default for Parity {
    fn default() -> Self {
        Self::None
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Odd => "odd",
            Self::Even => "even",
        })
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StopBits {
    One,
    Two,
}

impl StopBits {
    pub const ALL: [StopBits; 2] = [Self::One, Self::Two];
}

impl TryFrom<u8> for StopBits {
    type Error = PortError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(PortError::invalid_argument(format!(
                "Invalid number of stop bits: {}",
                other
            ))),
        }
    }
}

impl From<StopBits> for u8 {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }
}

impl Default for StopBits {
    fn default() -> Self {
        Self::One
    }
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Flow control modes.
///
/// Only RTS/CTS hardware handshaking is modelled; XON/XOFF is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControl {
    None,
    Hardware,
}

impl FlowControl {
    pub const ALL: [FlowControl; 2] = [Self::None, Self::Hardware];
}

impl FromStr for FlowControl {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "hardware" | "rtscts" => Ok(Self::Hardware),
            "software" | "xonxoff" => Err(PortError::invalid_argument(
                "Software flow control is not supported",
            )),
            _ => Err(PortError::invalid_argument(format!(
                "Invalid flow control: {:?}",
                s
            ))),
        }
    }
}

impl Default for FlowControl {
    fn default() -> Self {
        Self::None
    }
}

impl fmt::Display for FlowControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Hardware => "hardware",
        })
    }
}

/// The full set of line parameters applied after a port is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineSettings {
    pub baud_rate: BaudRate,
    pub char_size: CharSize,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            baud_rate: BaudRate::B9600,
            char_size: CharSize::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
        }
    }
}

impl fmt::Display for LineSettings {
    /// Conventional `9600 8N1` notation, with ` rtscts` for hardware flow.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parity = match self.parity {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        };
        write!(
            f,
            "{} {}{}{}",
            self.baud_rate, self.char_size, parity, self.stop_bits
        )?;
        if self.flow_control == FlowControl::Hardware {
            f.write_str(" rtscts")?;
        }
        Ok(())
    }
}
