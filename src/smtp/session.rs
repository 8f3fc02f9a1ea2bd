use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;

use tracing::trace;

use super::error::{SessionStage, SmtpError};
use super::types::{ProbeOutcome, SmtpReply};

/// One SMTP conversation over an established connection.
///
/// [`start`](Self::start) runs the mandatory preamble in strict order:
/// greeting (220), `EHLO` (2xx), `MAIL FROM` (2xx). Each step is issued
/// exactly once; any rejection or transport failure tears the session down
/// and surfaces the literal server response. After the preamble, any number
/// of [`probe`](Self::probe) calls reuse the established `MAIL FROM` state.
/// The session never issues `DATA`, so no mail can ever be sent.
pub(crate) struct SmtpSession {
    host: String,
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl SmtpSession {
    pub(crate) fn start(
        stream: TcpStream,
        host: &str,
        helo_name: &str,
        from_address: &str,
    ) -> Result<Self, SmtpError> {
        let reader = stream
            .try_clone()
            .map(BufReader::new)
            .map_err(|err| protocol(SessionStage::Greeting, err.to_string()))?;
        let mut session = Self {
            host: host.to_string(),
            stream,
            reader,
        };

        let greeting = session.read(SessionStage::Greeting)?;
        if greeting.code != 220 {
            return Err(protocol(
                SessionStage::Greeting,
                format!("unexpected greeting: {} {}", greeting.code, greeting.text),
            ));
        }

        let ehlo = session.exchange(&format!("EHLO {helo_name}"), SessionStage::Ehlo)?;
        if !ehlo.is_positive_completion() {
            return Err(protocol(
                SessionStage::Ehlo,
                format!("EHLO rejected: {} {}", ehlo.code, ehlo.text),
            ));
        }

        let mail = session.exchange(
            &format!("MAIL FROM:<{from_address}>"),
            SessionStage::MailFrom,
        )?;
        if !mail.is_positive_completion() {
            return Err(protocol(
                SessionStage::MailFrom,
                format!("MAIL FROM rejected: {} {}", mail.code, mail.text),
            ));
        }

        Ok(session)
    }

    /// Ask whether the server would accept mail for `recipient`. Transport
    /// failures are captured in the outcome instead of raised, so the
    /// caller decides whether another exchanger is worth trying.
    pub(crate) fn probe(&mut self, recipient: &str) -> ProbeOutcome {
        match self.round_trip(&format!("RCPT TO:<{recipient}>")) {
            Ok(reply) => ProbeOutcome::replied(reply),
            Err(err) => ProbeOutcome::failed(err.to_string()),
        }
    }

    /// Terminate the dialog with `RSET` then `QUIT`, best effort. Dropping
    /// the session closes the socket on every path.
    pub(crate) fn close(mut self) {
        if self.round_trip("RSET").is_ok() {
            self.round_trip("QUIT").ok();
        }
    }

    fn exchange(&mut self, command: &str, stage: SessionStage) -> Result<SmtpReply, SmtpError> {
        self.send(command)
            .map_err(|err| protocol(stage, err.to_string()))?;
        self.read(stage)
    }

    fn read(&mut self, stage: SessionStage) -> Result<SmtpReply, SmtpError> {
        let reply =
            read_reply(&mut self.reader).map_err(|err| protocol(stage, err.to_string()))?;
        trace!(host = %self.host, code = reply.code, "S: {}", reply.text);
        Ok(reply)
    }

    fn round_trip(&mut self, command: &str) -> io::Result<SmtpReply> {
        self.send(command)?;
        let reply = read_reply(&mut self.reader)?;
        trace!(host = %self.host, code = reply.code, "S: {}", reply.text);
        Ok(reply)
    }

    fn send(&mut self, command: &str) -> io::Result<()> {
        trace!(host = %self.host, "C: {command}");
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        self.stream.write_all(&line)?;
        self.stream.flush()
    }
}

fn protocol(stage: SessionStage, message: String) -> SmtpError {
    SmtpError::Protocol { stage, message }
}

/// Parse one SMTP reply, following `NNN-` continuation lines until the
/// terminal `NNN ` line and insisting every line agrees on the code.
pub(crate) fn read_reply<R: BufRead>(reader: &mut R) -> io::Result<SmtpReply> {
    let mut code = None;
    let mut text_lines = Vec::new();
    loop {
        let mut raw = String::new();
        let bytes = reader.read_line(&mut raw)?;
        if bytes == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed while reading reply",
            ));
        }
        while raw.ends_with('\n') || raw.ends_with('\r') {
            raw.pop();
        }

        // Replies from arbitrary servers may hold multibyte UTF-8 anywhere,
        // so every slice offset below must be a proven char boundary. The
        // digit check guarantees it for the code; the text separator is
        // fetched fallibly instead of sliced.
        let bytes = raw.as_bytes();
        if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid SMTP reply: '{raw}'"),
            ));
        }
        let parsed_code = raw[..3].parse::<u16>().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid SMTP status code: '{}'", &raw[..3]),
            )
        })?;
        if let Some(existing) = code {
            if existing != parsed_code {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("inconsistent SMTP reply codes: {existing} vs {parsed_code}"),
                ));
            }
        } else {
            code = Some(parsed_code);
        }

        let continuation = bytes.get(3).copied() == Some(b'-');
        let text = raw.get(4..).unwrap_or_default().to_string();
        text_lines.push(text);
        if !continuation {
            break;
        }
    }
    Ok(SmtpReply {
        code: code.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "SMTP reply missing status code")
        })?,
        text: text_lines.join("\n"),
    })
}
