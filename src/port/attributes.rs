//! Owned snapshot of a terminal's attribute block.
//!
//! `LineAttributes` wraps `libc::termios` and is the only place that touches
//! its bit fields. Everything above this module talks in terms of the typed
//! parameters from [`params`](super::params).

use super::params::{BaudRate, CharSize, FlowControl, Parity, StopBits};
use std::fmt;
use std::io;

/// A copy of a device's line-control attributes.
#[derive(Clone, Copy)]
pub struct LineAttributes {
    raw: libc::termios,
}

impl LineAttributes {
    /// An all-zero attribute block, as a freshly created mock device reports.
    pub fn zeroed() -> Self {
        // SAFETY: termios is a plain C struct of integers and arrays; the
        // all-zero bit pattern is a valid value.
        let raw: libc::termios = unsafe { std::mem::zeroed() };
        Self { raw }
    }

    pub(crate) fn from_raw(raw: libc::termios) -> Self {
        Self { raw }
    }

    pub(crate) fn as_raw(&self) -> &libc::termios {
        &self.raw
    }

    /// Switch to the baseline used right after open: no input, output or
    /// local processing, receiver enabled, modem lines ignored, and reads
    /// that return immediately with whatever is buffered.
    pub fn make_raw_baseline(&mut self) {
        self.raw.c_iflag = 0;
        self.raw.c_oflag = 0;
        self.raw.c_lflag = 0;
        self.raw.c_cflag |= libc::CREAD | libc::CLOCAL;
        self.set_read_timing(0, 0);
    }

    /// Set both input and output speed.
    ///
    /// Fails if the C library refuses the speed value.
    pub fn set_baud_rate(&mut self, rate: BaudRate) -> io::Result<()> {
        let speed = rate.speed();
        // SAFETY: `self.raw` is a valid, exclusively borrowed termios.
        let rc = unsafe { libc::cfsetispeed(&mut self.raw, speed) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: as above.
        let rc = unsafe { libc::cfsetospeed(&mut self.raw, speed) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// The input speed, if it is one of the enumerated rates.
    pub fn baud_rate(&self) -> Option<BaudRate> {
        // SAFETY: `self.raw` is a valid termios.
        let speed = unsafe { libc::cfgetispeed(&self.raw) };
        BaudRate::from_speed(speed)
    }

    /// Replace the CSIZE field.
    pub fn set_char_size(&mut self, size: CharSize) {
        self.raw.c_cflag &= !libc::CSIZE;
        self.raw.c_cflag |= size.flag();
    }

    /// The character size encoded in CSIZE.
    pub fn char_size(&self) -> CharSize {
        // Every value of the two-bit CSIZE field is one of CS5..CS8.
        CharSize::from_flag(self.raw.c_cflag & libc::CSIZE).unwrap_or(CharSize::Eight)
    }

    /// Set PARENB and PARODD for `parity`.
    pub fn set_parity(&mut self, parity: Parity) {
        match parity {
            Parity::Even => {
                self.raw.c_cflag |= libc::PARENB;
                self.raw.c_cflag &= !libc::PARODD;
            }
            Parity::Odd => {
                self.raw.c_cflag |= libc::PARENB | libc::PARODD;
            }
            Parity::None => {
                self.raw.c_cflag &= !libc::PARENB;
            }
        }
    }

    /// Parity as encoded by PARENB and PARODD.
    pub fn parity(&self) -> Parity {
        if self.raw.c_cflag & libc::PARENB == 0 {
            Parity::None
        } else if self.raw.c_cflag & libc::PARODD != 0 {
            Parity::Odd
        } else {
            Parity::Even
        }
    }

    /// Set or clear CSTOPB.
    pub fn set_stop_bits(&mut self, bits: StopBits) {
        match bits {
            StopBits::One => self.raw.c_cflag &= !libc::CSTOPB,
            StopBits::Two => self.raw.c_cflag |= libc::CSTOPB,
        }
    }

    /// Two stop bits when CSTOPB is set.
    pub fn stop_bits(&self) -> StopBits {
        if self.raw.c_cflag & libc::CSTOPB != 0 {
            StopBits::Two
        } else {
            StopBits::One
        }
    }

    /// Set or clear CRTSCTS.
    pub fn set_flow_control(&mut self, flow: FlowControl) {
        match flow {
            FlowControl::None => self.raw.c_cflag &= !libc::CRTSCTS,
            FlowControl::Hardware => self.raw.c_cflag |= libc::CRTSCTS,
        }
    }

    /// Hardware flow control when CRTSCTS is set.
    pub fn flow_control(&self) -> FlowControl {
        if self.raw.c_cflag & libc::CRTSCTS != 0 {
            FlowControl::Hardware
        } else {
            FlowControl::None
        }
    }

    /// Set the non-canonical read controls: minimum byte count (`VMIN`) and
    /// inter-byte timer in deciseconds (`VTIME`).
    pub fn set_read_timing(&mut self, min_bytes: u8, deciseconds: u8) {
        self.raw.c_cc[libc::VMIN] = min_bytes;
        self.raw.c_cc[libc::VTIME] = deciseconds;
    }

    /// `(VMIN, VTIME)`.
    pub fn read_timing(&self) -> (u8, u8) {
        (self.raw.c_cc[libc::VMIN], self.raw.c_cc[libc::VTIME])
    }

    /// Raw `c_cflag`.
    pub fn control_flags(&self) -> libc::tcflag_t {
        self.raw.c_cflag
    }

    /// Raw `c_iflag`.
    pub fn input_flags(&self) -> libc::tcflag_t {
        self.raw.c_iflag
    }

    /// Raw `c_oflag`.
    pub fn output_flags(&self) -> libc::tcflag_t {
        self.raw.c_oflag
    }

    /// Raw `c_lflag`.
    pub fn local_flags(&self) -> libc::tcflag_t {
        self.raw.c_lflag
    }
}

impl Default for LineAttributes {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl PartialEq for LineAttributes {
    fn eq(&self, other: &Self) -> bool {
        self.raw.c_iflag == other.raw.c_iflag
            && self.raw.c_oflag == other.raw.c_oflag
            && self.raw.c_cflag == other.raw.c_cflag
            && self.raw.c_lflag == other.raw.c_lflag
            && self.raw.c_cc == other.raw.c_cc
            && self.baud_rate() == other.baud_rate()
    }
}

impl fmt::Debug for LineAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (vmin, vtime) = self.read_timing();
        f.debug_struct("LineAttributes")
            .field("iflag", &format_args!("{:#o}", self.raw.c_iflag))
            .field("oflag", &format_args!("{:#o}", self.raw.c_oflag))
            .field("cflag", &format_args!("{:#o}", self.raw.c_cflag))
            .field("lflag", &format_args!("{:#o}", self.raw.c_lflag))
            .field("baud_rate", &self.baud_rate())
            .field("vmin", &vmin)
            .field("vtime", &vtime)
            .finish()
    }
}
