use anyhow::{anyhow, Result as AnyResult};
use clap::{arg, value_parser, ArgMatches, Command};
use labelart::{
    extract::Extractor,
    graphics::parse_operations,
    import::{import_page, load_content, ExtractOption, ExtractOptionBuilder},
    merge_by_style_and_proximity,
};
use log::info;
use mimalloc::MiMalloc;
use std::path::PathBuf;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn content_args(cmd: Command) -> Command {
    cmd.arg(
        arg!(-f <filename> "Content stream file to dump")
            .value_parser(value_parser!(PathBuf))
            .required(true),
    )
    .arg(arg!(-z --compressed "Content stream is FlateDecode compressed"))
    .arg(
        arg!(--height <height> "Page height in points, default: 841.89 (A4)")
            .value_parser(value_parser!(f64)),
    )
}

fn cli() -> Command {
    Command::new("labelart-dump")
        .about("Dump vector objects and texts extracted from PDF page content stream")
        .subcommand_required(true)
        .subcommand(content_args(Command::new("ops").about("dump parsed operations")))
        .subcommand(content_args(
            Command::new("objects")
                .about("dump painted objects")
                .arg(
                    arg!(--steps <steps> "Stop after <steps> operations")
                        .value_parser(value_parser!(usize)),
                )
                .arg(arg!(--merge "Merge objects of same style close to each other"))
                .arg(
                    arg!(--threshold <threshold> "Merge proximity threshold in mm, default: 50")
                        .value_parser(value_parser!(f64)),
                ),
        ))
        .subcommand(content_args(Command::new("text").about("dump text spans")))
}

struct ContentArgs<'a> {
    path: &'a PathBuf,
    compressed: bool,
    option: ExtractOption,
}

impl<'a> ContentArgs<'a> {
    fn from_matches(m: &'a ArgMatches) -> AnyResult<Self> {
        let path = m
            .get_one::<PathBuf>("filename")
            .ok_or_else(|| anyhow!("filename is required"))?;
        let mut option = ExtractOptionBuilder::new();
        if let Some(height) = m.get_one::<f64>("height") {
            option = option.page_height_pt(*height);
        }
        if let Some(threshold) = m.try_get_one::<f64>("threshold").ok().flatten() {
            option = option.proximity_threshold_mm(*threshold);
        }
        Ok(Self {
            path,
            compressed: m.get_flag("compressed"),
            option: option.build(),
        })
    }

    fn load(&self) -> AnyResult<Vec<u8>> {
        Ok(load_content(self.path, self.compressed)?)
    }
}

fn dump_ops(args: &ContentArgs) -> AnyResult<()> {
    let content = args.load()?;
    let (remains, ops) = parse_operations(&content).map_err(|e| anyhow!("{}", e))?;
    for op in ops {
        println!("{:?}", op);
    }
    if !remains.is_empty() {
        eprintln!(
            "content broken at offset {}",
            content.len() - remains.len()
        );
    }
    Ok(())
}

fn dump_objects(args: &ContentArgs, steps: Option<usize>, merge: bool) -> AnyResult<()> {
    let objects = match steps {
        Some(steps) => {
            let content = args.load()?;
            let (_, ops) = parse_operations(&content).map_err(|e| anyhow!("{}", e))?;
            let mut extractor = Extractor::new(args.option.page_height_mm());
            ops.into_iter().take(steps).for_each(|op| extractor.exec(op));
            info!("state after {} steps: {:?}", steps, extractor.state());
            extractor.finish()
        }
        None => import_page(&args.load()?, &args.option)?.objects,
    };

    let objects = if merge {
        merge_by_style_and_proximity(&objects, args.option.proximity_threshold_mm())
    } else {
        objects
    };
    for o in objects {
        println!("{:?}", o);
    }
    Ok(())
}

fn dump_text(args: &ContentArgs) -> AnyResult<()> {
    let page = import_page(&args.load()?, &args.option)?;
    for span in page.texts {
        println!("{:?}", span);
    }
    Ok(())
}

fn main() -> AnyResult<()> {
    env_logger::init();

    match cli().get_matches().subcommand() {
        Some(("ops", sub_m)) => dump_ops(&ContentArgs::from_matches(sub_m)?),
        Some(("objects", sub_m)) => dump_objects(
            &ContentArgs::from_matches(sub_m)?,
            sub_m.get_one::<usize>("steps").copied(),
            sub_m.get_flag("merge"),
        ),
        Some(("text", sub_m)) => dump_text(&ContentArgs::from_matches(sub_m)?),
        _ => unreachable!("subcommand required"),
    }
}
