//! RFC 1928 `CONNECT` negotiation and RFC 1929 username/password
//! subnegotiation, generic over any `AsyncRead + AsyncWrite` transport so
//! callers can drive it directly over a `tokio::net::TcpStream` dialed to
//! the SOCKS5 proxy.

use std::net::IpAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::Socks5Error;

const VERSION: u8 = 0x05;
const METHOD_NO_AUTH: u8 = 0x00;
const METHOD_USER_PASS: u8 = 0x02;
const METHOD_NO_ACCEPTABLE: u8 = 0xff;
const CMD_CONNECT: u8 = 0x01;
const ATYP_IPV4: u8 = 0x01;
const ATYP_DOMAIN: u8 = 0x03;
const ATYP_IPV6: u8 = 0x04;

/// Negotiate a `CONNECT` to `target_host:target_port` over an already
/// TCP-connected SOCKS5 `stream`, optionally authenticating with
/// `username`/`password`. On success, `stream` is positioned at the start
/// of the proxied byte stream to `target_host:target_port`.
pub async fn connect<S>(
    stream: &mut S,
    target_host: &str,
    target_port: u16,
    credential: Option<(&str, &str)>,
) -> Result<(), Socks5Error>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    negotiate_method(stream, credential.is_some()).await?;
    if let Some((username, password)) = credential {
        authenticate(stream, username, password).await?;
    }
    request_connect(stream, target_host, target_port).await
}

async fn negotiate_method<S>(stream: &mut S, want_auth: bool) -> Result<(), Socks5Error>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let methods: &[u8] = if want_auth {
        &[METHOD_NO_AUTH, METHOD_USER_PASS]
    } else {
        &[METHOD_NO_AUTH]
    };

    let mut greeting = Vec::with_capacity(2 + methods.len());
    greeting.push(VERSION);
    greeting.push(methods.len() as u8);
    greeting.extend_from_slice(methods);
    stream.write_all(&greeting).await?;

    let mut reply = [0u8; 2];
    stream.read_exact(&mut reply).await?;
    if reply[0] != VERSION {
        return Err(Socks5Error::Protocol("unexpected SOCKS version in method reply"));
    }
    match reply[1] {
        METHOD_NO_AUTH => Ok(()),
        METHOD_USER_PASS if want_auth => Ok(()),
        METHOD_NO_ACCEPTABLE => Err(Socks5Error::NoAcceptableAuthMethod),
        _ => Err(Socks5Error::Protocol("proxy selected an unrequested auth method")),
    }
}

async fn authenticate<S>(stream: &mut S, username: &str, password: &str) -> Result<(), Socks5Error>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    if username.len() > 255 || password.len() > 255 {
        return Err(Socks5Error::InvalidAddress("username/password must each be at most 255 bytes"));
    }

    let mut request = Vec::with_capacity(3 + username.len() + password.len());
    request.push(0x01);
    request.push(username.len() as u8);
    request.extend_from_slice(username.as_bytes());
    request.push(password.len() as u8);
    request.extend_from_slice(password.as_bytes());
    stream.write_all(&request).await?;

    let mut reply = [0u8; 2];
    stream.read_exact(&mut reply).await?;
    if reply[1] != 0x00 {
        return Err(Socks5Error::AuthFailed);
    }
    Ok(())
}

async fn request_connect<S>(stream: &mut S, target_host: &str, target_port: u16) -> Result<(), Socks5Error>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let mut request = vec![VERSION, CMD_CONNECT, 0x00];
    encode_address(&mut request, target_host)?;
    request.extend_from_slice(&target_port.to_be_bytes());
    stream.write_all(&request).await?;

    let mut header = [0u8; 4];
    stream.read_exact(&mut header).await?;
    if header[0] != VERSION {
        return Err(Socks5Error::Protocol("unexpected SOCKS version in CONNECT reply"));
    }
    if header[1] != 0x00 {
        return Err(Socks5Error::RequestFailed(header[1]));
    }

    // Drain the bound-address field (unused by a CONNECT-only client).
    match header[3] {
        ATYP_IPV4 => skip(stream, 4 + 2).await?,
        ATYP_IPV6 => skip(stream, 16 + 2).await?,
        ATYP_DOMAIN => {
            let mut len = [0u8; 1];
            stream.read_exact(&mut len).await?;
            skip(stream, len[0] as usize + 2).await?;
        }
        _ => return Err(Socks5Error::Protocol("unknown address type in CONNECT reply")),
    }
    Ok(())
}

async fn skip<S>(stream: &mut S, n: usize) -> Result<(), Socks5Error>
where
    S: tokio::io::AsyncRead + Unpin,
{
    let mut buf = vec![0u8; n];
    stream.read_exact(&mut buf).await?;
    Ok(())
}

fn encode_address(out: &mut Vec<u8>, host: &str) -> Result<(), Socks5Error> {
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => {
            out.push(ATYP_IPV4);
            out.extend_from_slice(&ip.octets());
        }
        Ok(IpAddr::V6(ip)) => {
            out.push(ATYP_IPV6);
            out.extend_from_slice(&ip.octets());
        }
        Err(_) => {
            if host.len() > 255 {
                return Err(Socks5Error::InvalidAddress("domain name longer than 255 bytes"));
            }
            out.push(ATYP_DOMAIN);
            out.push(host.len() as u8);
            out.extend_from_slice(host.as_bytes());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::{TcpListener, TcpStream};

    #[tokio::test]
    async fn connects_without_auth_to_domain_target() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut greeting = [0u8; 2];
            socket.read_exact(&mut greeting).await.unwrap();
            let mut methods = vec![0u8; greeting[1] as usize];
            socket.read_exact(&mut methods).await.unwrap();
            socket.write_all(&[VERSION, METHOD_NO_AUTH]).await.unwrap();

            let mut header = [0u8; 4];
            socket.read_exact(&mut header).await.unwrap();
            assert_eq!(header, [VERSION, CMD_CONNECT, 0x00, ATYP_DOMAIN]);
            let mut len = [0u8; 1];
            socket.read_exact(&mut len).await.unwrap();
            let mut domain = vec![0u8; len[0] as usize];
            socket.read_exact(&mut domain).await.unwrap();
            assert_eq!(domain, b"target.example");
            let mut port = [0u8; 2];
            socket.read_exact(&mut port).await.unwrap();
            assert_eq!(u16::from_be_bytes(port), 443);

            socket
                .write_all(&[VERSION, 0x00, 0x00, ATYP_IPV4, 0, 0, 0, 0, 0, 0])
                .await
                .unwrap();
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        connect(&mut client, "target.example", 443, None).await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn surfaces_request_failure_code() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut greeting = [0u8; 2];
            socket.read_exact(&mut greeting).await.unwrap();
            let mut methods = vec![0u8; greeting[1] as usize];
            socket.read_exact(&mut methods).await.unwrap();
            socket.write_all(&[VERSION, METHOD_NO_AUTH]).await.unwrap();

            let mut request = vec![0u8; 4];
            socket.read_exact(&mut request).await.unwrap();
            let mut len = [0u8; 1];
            socket.read_exact(&mut len).await.unwrap();
            let mut rest = vec![0u8; len[0] as usize + 2];
            socket.read_exact(&mut rest).await.unwrap();

            socket.write_all(&[VERSION, 0x05, 0x00, ATYP_IPV4, 0, 0, 0, 0, 0, 0]).await.unwrap();
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        let result = connect(&mut client, "target.example", 443, None).await;
        assert!(matches!(result, Err(Socks5Error::RequestFailed(0x05))));
        server.await.unwrap();
    }
}
