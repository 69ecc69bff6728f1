pub(crate) mod utils;

use ::infrastructures::boundaries::DownloadVideoView;
use ::infrastructures::gateways::downloaders::YtdlpDownloader;
use ::use_cases::boundaries::Accept;
use ::use_cases::boundaries::DownloadVideoOutputBoundary;
use ::use_cases::boundaries::DownloadVideoRequestModel;
use ::use_cases::gateways::VideoDownloader;
use ::use_cases::interactors::DownloadVideoInteractor;

use crate::utils::aliases::Fallible;
use crate::utils::extensions::OptionExt;

#[tokio::main]
async fn main() -> Fallible<()> {
    let writer = ::tracing_appender::rolling::minutely("logs", "cli.log");
    let (writer, _guard) = ::tracing_appender::non_blocking(writer);

    ::tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            ::tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| ::tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .init();

    let command = ::clap::Command::new("vgrab")
        .arg(
            ::clap::Arg::new("directory")
                .short('o')
                .long("directory")
                .default_value(".")
                .value_parser(::clap::value_parser!(::std::path::PathBuf)),
        )
        .arg(
            ::clap::Arg::new("format")
                .short('f')
                .long("format")
                .default_value("best")
                .value_parser(::clap::value_parser!(::std::string::String)),
        );

    let matches = command.get_matches();

    let directory = ::std::path::absolute(matches.get_one::<::std::path::PathBuf>("directory").ok()?)?;
    let format = matches.get_one::<::std::string::String>("format").ok()?.to_owned();

    println!("--- vgrab: video downloader (using yt-dlp) ---");

    if let Err(err) = YtdlpDownloader::probe().await {
        eprintln!("\nFATAL ERROR: the `yt-dlp` program is not available: {}", err);
        eprintln!("Please install it, e.g.: pip install yt-dlp");
        ::std::process::exit(1);
    }

    let url = prompt("Please enter the full video URL: ")?;

    let view = ::std::sync::Arc::new(DownloadVideoView::new()?);
    let downloader = ::std::sync::Arc::new(
        YtdlpDownloader::builder()
            .directory(directory.clone())
            .format(format)
            .build(),
    );

    let interactor = ::std::sync::Arc::new(
        DownloadVideoInteractor::builder()
            .output_boundary(::std::sync::Arc::clone(&view) as ::std::sync::Arc<dyn DownloadVideoOutputBoundary>)
            .downloader(::std::sync::Arc::clone(&downloader) as ::std::sync::Arc<dyn VideoDownloader>)
            .directory(directory)
            .build(),
    );

    let request = DownloadVideoRequestModel::builder().url(url).build();
    interactor.accept(request).await?;

    println!("\n----------------------------------------------------");

    Ok(())
}

fn prompt(message: &str) -> Fallible<String> {
    use ::std::io::Write as _;

    print!("{}", message);
    ::std::io::stdout().flush()?;

    let mut line = String::new();
    ::std::io::stdin().read_line(&mut line)?;

    Ok(line)
}
