// Face settings
// Text-based key=value format, one setting per line, # starts a comment.
// Firmware builds read it from BLOCKFACE_SETTINGS at compile time.
use core::fmt;

use log::warn;

use crate::kernel::TimeOfDay;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceSettings {
    pub clock_24h: bool,
    pub start_time: TimeOfDay, // wall clock base; no RTC
    pub demo: bool,            // scripted time instead of the wall clock
    pub seed: u32,             // reveal order start positions
}

impl Default for FaceSettings {
    fn default() -> Self {
        Self::defaults()
    }
}

impl FaceSettings {
    pub const fn defaults() -> Self {
        Self {
            clock_24h: true,
            start_time: TimeOfDay::new(10, 9, 0),
            demo: false,
            seed: 0x5eed,
        }
    }

    fn sanitize(&mut self) {
        self.start_time.hour = self.start_time.hour.min(23);
        self.start_time.minute = self.start_time.minute.min(59);
        self.start_time.second = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    /// Line has no `=`
    MissingEquals,
    /// Known key with a value that does not parse
    BadValue(&'static str),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::MissingEquals => write!(f, "expected key=value"),
            SettingsError::BadValue(key) => write!(f, "bad value for {}", key),
        }
    }
}

// Text format parser / writer
fn trim(s: &[u8]) -> &[u8] {
    let mut start = 0;
    let mut end = s.len();
    while start < end && matches!(s[start], b' ' | b'\t' | b'\r') {
        start += 1;
    }
    while end > start && matches!(s[end - 1], b' ' | b'\t' | b'\r') {
        end -= 1;
    }
    &s[start..end]
}

fn parse_u32(s: &[u8]) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut val: u32 = 0;
    for &b in s {
        if !b.is_ascii_digit() {
            return None;
        }
        val = val.checked_mul(10)?.checked_add((b - b'0') as u32)?;
    }
    Some(val)
}

fn parse_flag(s: &[u8]) -> Option<bool> {
    match parse_u32(s)? {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

// HH:MM, 24 hour
fn parse_hhmm(s: &[u8]) -> Option<TimeOfDay> {
    let colon = s.iter().position(|&b| b == b':')?;
    let hour = parse_u32(&s[..colon])?;
    let minute = parse_u32(&s[colon + 1..])?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(TimeOfDay::new(hour as u8, minute as u8, 0))
}

fn apply_setting(key: &[u8], val: &[u8], s: &mut FaceSettings) -> Result<(), SettingsError> {
    match key {
        b"clock_24h" => {
            s.clock_24h = parse_flag(val).ok_or(SettingsError::BadValue("clock_24h"))?;
        }
        b"start_time" => {
            s.start_time = parse_hhmm(val).ok_or(SettingsError::BadValue("start_time"))?;
        }
        b"demo" => {
            s.demo = parse_flag(val).ok_or(SettingsError::BadValue("demo"))?;
        }
        b"seed" => {
            s.seed = parse_u32(val).ok_or(SettingsError::BadValue("seed"))?;
        }
        _ => {} // unknown keys ignored
    }
    Ok(())
}

/// Parse settings text over the defaults. Bad lines are logged and skipped.
pub fn parse_settings_txt(data: &[u8]) -> FaceSettings {
    let mut settings = FaceSettings::defaults();
    for (n, line) in data.split(|&b| b == b'\n').enumerate() {
        let line = trim(line);
        if line.is_empty() || line[0] == b'#' {
            continue;
        }
        let result = match line.iter().position(|&b| b == b'=') {
            Some(eq) => apply_setting(trim(&line[..eq]), trim(&line[eq + 1..]), &mut settings),
            None => Err(SettingsError::MissingEquals),
        };
        if let Err(e) = result {
            warn!("[SETTINGS] line {}: {}", n + 1, e);
        }
    }
    settings.sanitize();
    settings
}

// tiny cursor writer for building the text representation
struct TxtWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> TxtWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn put(&mut self, data: &[u8]) {
        let n = data.len().min(self.buf.len() - self.pos);
        self.buf[self.pos..self.pos + n].copy_from_slice(&data[..n]);
        self.pos += n;
    }

    fn put_num(&mut self, val: u32, width: usize) {
        let mut digits = [b'0'; 10];
        let mut i = 10;
        let mut v = val;
        while v > 0 || 10 - i < width.max(1) {
            i -= 1;
            digits[i] = b'0' + (v % 10) as u8;
            v /= 10;
        }
        self.put(&digits[i..]);
    }

    fn kv_num(&mut self, key: &[u8], val: u32) {
        self.put(key);
        self.put(b"=");
        self.put_num(val, 1);
        self.put(b"\n");
    }

    fn kv_time(&mut self, key: &[u8], t: TimeOfDay) {
        self.put(key);
        self.put(b"=");
        self.put_num(t.hour as u32, 2);
        self.put(b":");
        self.put_num(t.minute as u32, 2);
        self.put(b"\n");
    }

    fn len(&self) -> usize {
        self.pos
    }
}

/// Render `s` into `buf`, truncating if it does not fit. Returns bytes written.
pub fn write_settings_txt(s: &FaceSettings, buf: &mut [u8]) -> usize {
    let mut wr = TxtWriter::new(buf);
    wr.put(b"# blockface settings\n");
    wr.put(b"# lines starting with # are ignored\n\n");
    wr.kv_num(b"clock_24h", s.clock_24h as u32);
    wr.kv_time(b"start_time", s.start_time);
    wr.kv_num(b"demo", s.demo as u32);
    wr.kv_num(b"seed", s.seed);
    wr.len()
}
