use anyhow::{Context as AnyhowContext, Result};
use directive_protocol::{read_frame, write_frame};
use std::io;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};

use crate::dispatch::{Dispatcher, Session};

/// Answers frames from `reader` on `writer`, strictly one at a time, until end of stream.
///
/// Request-level failures are answered in-band and never stop the loop; only transport errors
/// (a failed read or write) end it early. Returns the number of requests answered.
pub async fn serve<R, W>(dispatcher: &Dispatcher, reader: &mut R, writer: &mut W) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut handled = 0usize;
    while let Some(body) = read_frame(reader).await? {
        let response = dispatcher.handle_frame(&body);
        write_frame(writer, &response).await?;
        handled += 1;
    }
    log::info!("End of input after {handled} request(s)");
    Ok(handled)
}

pub async fn serve_stdio(session: Session) -> Result<()> {
    log::info!(
        "Serving directive root {} over stdio",
        session.root().path().display()
    );
    let dispatcher = Dispatcher::new(session);
    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    serve(&dispatcher, &mut stdin, &mut stdout)
        .await
        .context("stdio transport failed")?;
    Ok(())
}
