use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;

/// Read `rd` to EOF on its own task, handing every complete line to `on_line`.
///
/// Bytes are decoded lossily; a trailing partial line is delivered at EOF.
pub(crate) fn pump_lines<R, F>(
    mut rd: R,
    label: &'static str,
    mut on_line: F,
) -> JoinHandle<std::io::Result<u64>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    F: FnMut(String) + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; 16 * 1024];
        let mut total = 0u64;
        let mut line_buf: Vec<u8> = Vec::with_capacity(8 * 1024);

        loop {
            let n = match rd.read(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    tracing::debug!(stream = label, error = %e, "pipe read failed");
                    return Err(e);
                }
            };
            if n == 0 {
                break;
            }
            total += n as u64;

            line_buf.extend_from_slice(&buf[..n]);
            while let Some(pos) = line_buf.iter().position(|&b| b == b'\n') {
                let mut one = line_buf.drain(..=pos).collect::<Vec<u8>>();
                trim_newline(&mut one);
                on_line(String::from_utf8_lossy(&one).into_owned());
            }
        }

        if !line_buf.is_empty() {
            trim_newline(&mut line_buf);
            on_line(String::from_utf8_lossy(&line_buf).into_owned());
        }

        Ok(total)
    })
}

fn trim_newline(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
}
