mod cli;

use std::fs::File;
use std::io::BufWriter;

use snafu::{ResultExt, Snafu};
use vellum_pdf::{
    Dictionary, DocumentWriter, FileId, IndirectObject, Info, Object, Outline, PageIndex,
    PdfString, Rectangle, Stream, Version, XrefPolicy,
};

#[derive(Debug, Snafu)]
pub struct Error(error::Error);
type Result<T> = std::result::Result<T, Error>;

fn main() -> std::result::Result<(), Box<Error>> {
    let cli = cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    run(cli).map_err(|err| err.into())
}

fn run(cli: cli::Cli) -> Result<()> {
    let policy = if cli.packed {
        XrefPolicy::Stream
    } else {
        XrefPolicy::Table
    };

    let file = File::create(&cli.output).with_context(|_| error::CreateFile {
        path: cli.output.clone(),
    })?;
    let mut writer = DocumentWriter::new(BufWriter::new(file), Version::Pdf1_7, policy)
        .context(error::Document)?;

    let font = write_font(&mut writer)?;
    let mut pages = PageIndex::new();
    let mut outline = Outline::new();

    for number in 1..=cli.pages.max(1) {
        let page = build_page(&mut writer, font, number)?;
        pages.append(page);

        if cli.bookmarks {
            outline.add_top_level(Dictionary::from([(
                "Title",
                Object::from(PdfString::text(&format!("Page {number}"))),
            )]));
        }
    }

    let pages_root = writer
        .write_page_tree(&mut pages, None)
        .context(error::Document)?;
    let outline_root = writer.write_outline(&mut outline).context(error::Document)?;
    let root = writer
        .write_catalog(pages_root, outline_root)
        .context(error::Document)?;

    let info = Info {
        title: cli.title,
        producer: Some(format!("vellum {}", env!("CARGO_PKG_VERSION"))),
        ..Info::default()
    };
    let info_ref = writer.write_info(&info).context(error::Document)?;

    let file_id = FileId::generate(cli.output.as_os_str().as_encoded_bytes());
    writer
        .finish(root, Some(info_ref), None, Some(file_id))
        .context(error::Document)?;

    tracing::info!(
        path = %cli.output.display(),
        pages = pages.count(),
        packed = cli.packed,
        "document written"
    );

    Ok(())
}

fn write_font<W: std::io::Write>(
    writer: &mut DocumentWriter<W>,
) -> Result<vellum_pdf::IndirectReference> {
    let font = Dictionary::from([
        ("Type", Object::Name("Font".into())),
        ("Subtype", Object::Name("Type1".into())),
        ("BaseFont", Object::Name("Helvetica".into())),
    ]);

    let id = writer.assign();
    let object = IndirectObject::new(id, 0, Object::from(font));
    writer.write_object(&object).context(error::Document)?;

    Ok(object.reference())
}

fn build_page<W: std::io::Write>(
    writer: &mut DocumentWriter<W>,
    font: vellum_pdf::IndirectReference,
    number: usize,
) -> Result<Dictionary> {
    let content = format!("BT /F1 24 Tf 72 720 Td (Page {number}) Tj ET");
    let stream = Stream::new(Dictionary::new(), content.into_bytes());

    let content_id = writer.assign();
    let object = IndirectObject::new(content_id, 0, Object::from(stream));
    writer.write_object(&object).context(error::Document)?;

    let media_box = Rectangle::with_size(612.0, 792.0).to_array();
    let resources = Dictionary::from([(
        "Font",
        Object::from(Dictionary::from([("F1", Object::from(font))])),
    )]);

    Ok(Dictionary::from([
        ("MediaBox", Object::from(media_box)),
        ("Resources", Object::from(resources)),
        ("Contents", Object::from(object.reference())),
    ]))
}

mod error {
    use std::path::PathBuf;

    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)), context(suffix(false)))]
    pub(super) enum Error {
        #[snafu(display("Failed to create file: {}", path.display()))]
        CreateFile {
            path: PathBuf,
            source: std::io::Error,
        },

        #[snafu(display("Error writing document"))]
        Document {
            source: vellum_pdf::document::Error,
        },
    }
}
