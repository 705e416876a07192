use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use photos_api_client::{
    AccessToken, PhotosClientBuilder,
    photos_api::{
        API_BASE_URL,
        media_items::SearchOptions,
        options::{ListAlbumsOptions, ListMediaItemsOptions},
    },
    stream::ItemStream,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Browse a Photos library from the command line. Results are printed as JSON lines.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// OAuth 2.0 access token with a Photos Library scope
    #[arg(short, long)]
    access_token: String,

    /// API base URL
    #[arg(long, default_value = API_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the user's albums
    Albums {
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// List albums shared with the user
    SharedAlbums,
    /// List every media item in the library
    MediaItems {
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// List the media items of one album
    Search {
        #[arg(long)]
        album_id: String,
    },
    /// Fetch media items by id
    Get {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let client = PhotosClientBuilder::new(AccessToken(args.access_token))
        .base_url(args.base_url)
        .build()
        .context("Could not create Photos client")?;

    let cancellation_token = CancellationToken::new();
    let ctrl_c_token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Ctrl-C received, stopping.");
            ctrl_c_token.cancel();
        }
    });

    match args.command {
        Command::Albums { page_size } => {
            let options = ListAlbumsOptions {
                page_size,
                ..ListAlbumsOptions::default()
            };
            print_stream(client.albums().list_stream(Some(&options), cancellation_token)).await
        }
        Command::SharedAlbums => {
            print_stream(client.shared_albums().list_stream(None, cancellation_token)).await
        }
        Command::MediaItems { page_size } => {
            let options = ListMediaItemsOptions { page_size };
            print_stream(
                client
                    .media_items()
                    .list_stream(Some(&options), cancellation_token),
            )
            .await
        }
        Command::Search { album_id } => {
            let options = SearchOptions {
                album_id: Some(album_id),
                ..SearchOptions::default()
            };
            print_stream(
                client
                    .media_items()
                    .search_stream(Some(&options), cancellation_token),
            )
            .await
        }
        Command::Get { ids } => {
            print_stream(client.media_items().batch_get_stream(ids, cancellation_token)).await
        }
    }
}

/// Print items as they arrive. Stops at the first error; a cancelled stream just ends.
async fn print_stream<T: Serialize>(mut stream: ItemStream<T>) -> anyhow::Result<()> {
    let mut count = 0usize;
    while let Some(item) = stream.next().await {
        let item = item.inspect_err(|e| {
            if let Some(status) = e.api_status() {
                log::error!("Photos API rejected the request: {status}");
            }
        });
        let item = item.context("Stream failed")?;
        println!("{}", serde_json::to_string(&item)?);
        count += 1;
    }
    log::info!("Printed {count} items");
    Ok(())
}
