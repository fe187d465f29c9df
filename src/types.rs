use std::fmt;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Destination address requested by a SOCKS5 client.
///
/// Produced by the protocol layer after the request header has been decoded.
/// `fqdn` is carried through untouched; the mapping engine never resolves it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddrSpec {
    /// Domain name as sent by the client (empty for IP requests)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fqdn: String,
    /// IP address, if the client sent one or the protocol layer resolved it
    #[serde(default)]
    pub ip: Option<IpAddr>,
    /// TCP port
    pub port: u16,
}

impl AddrSpec {
    /// Create an AddrSpec from an IP address and port
    pub fn from_ip(ip: IpAddr, port: u16) -> Self {
        Self {
            fqdn: String::new(),
            ip: Some(ip),
            port,
        }
    }

    /// Create an AddrSpec from a socket address
    pub fn from_socket_addr(addr: SocketAddr) -> Self {
        Self::from_ip(addr.ip(), addr.port())
    }

    /// Create an unresolved AddrSpec from a domain name
    pub fn from_fqdn(fqdn: impl Into<String>, port: u16) -> Self {
        Self {
            fqdn: fqdn.into(),
            ip: None,
            port,
        }
    }

    /// Socket address to dial, if an IP is present
    pub fn to_socket_addr(&self) -> Option<SocketAddr> {
        self.ip.map(|ip| SocketAddr::new(ip, self.port))
    }
}

impl From<SocketAddr> for AddrSpec {
    fn from(addr: SocketAddr) -> Self {
        Self::from_socket_addr(addr)
    }
}

impl fmt::Display for AddrSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.ip, self.fqdn.is_empty()) {
            (Some(ip), false) => write!(f, "{} ({}):{}", self.fqdn, ip, self.port),
            (None, false) => write!(f, "{}:{}", self.fqdn, self.port),
            (Some(ip @ IpAddr::V6(_)), true) => write!(f, "[{}]:{}", ip, self.port),
            (Some(ip), true) => write!(f, "{}:{}", ip, self.port),
            (None, true) => write!(f, "<nil>:{}", self.port),
        }
    }
}

/// SOCKS5 request command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Connect,
    Bind,
    Associate,
}

impl Command {
    /// Wire value of the command byte
    pub fn code(self) -> u8 {
        match self {
            Command::Connect => 0x01,
            Command::Bind => 0x02,
            Command::Associate => 0x03,
        }
    }

    /// Decode a command byte; unknown commands yield `None`
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Command::Connect),
            0x02 => Some(Command::Bind),
            0x03 => Some(Command::Associate),
            _ => None,
        }
    }
}

/// Decoded client request handed to the rewrite hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Requested command
    pub command: Command,
    /// Address of the connecting client
    pub remote_addr: Option<AddrSpec>,
    /// Destination the client asked for
    pub dest_addr: AddrSpec,
}

impl Request {
    /// Create a CONNECT request for the given destination
    pub fn connect(dest_addr: AddrSpec) -> Self {
        Self {
            command: Command::Connect,
            remote_addr: None,
            dest_addr,
        }
    }

    /// Set the client address
    pub fn with_remote_addr(mut self, addr: AddrSpec) -> Self {
        self.remote_addr = Some(addr);
        self
    }
}
