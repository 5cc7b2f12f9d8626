//! Venn Sort entry point
//!
//! The browser build starts from `wasm_start` in the library. Natively this
//! runs a line-oriented front end against the scoring service.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    use venn_sort::Game;
    use venn_sort::api::HttpAuthority;
    use venn_sort::audio::{NullBackend, SoundManager};
    use venn_sort::settings::Settings;
    use venn_sort::sim::CircleId;

    type NativeGame = Game<HttpAuthority, NullBackend>;

    /// One line of user input
    #[derive(Debug, Clone, PartialEq)]
    pub enum Command {
        Start { name: String, class: String },
        Show,
        Toggle(CircleId),
        Circle(CircleId, f32, f32),
        Size(CircleId, f32),
        Grow(CircleId, i32),
        Item(usize, f32, f32),
        Submit,
        Next,
        Leaderboard,
        Mute,
        Abandon,
        Help,
        Quit,
    }

    impl Command {
        pub fn parse(line: &str) -> Result<Self, String> {
            let words: Vec<&str> = line.split_whitespace().collect();
            let circle = |s: &str| CircleId::from_label(s).ok_or_else(|| format!("no circle {s}"));
            let number = |s: &str| s.parse::<f32>().map_err(|_| format!("not a number: {s}"));

            match words.as_slice() {
                // Names may contain spaces; the class is the last word
                ["start", name @ .., class] if !name.is_empty() => Ok(Command::Start {
                    name: name.join(" "),
                    class: (*class).to_string(),
                }),
                ["show"] => Ok(Command::Show),
                ["toggle", id] => Ok(Command::Toggle(circle(id)?)),
                ["circle", id, x, y] => Ok(Command::Circle(circle(id)?, number(x)?, number(y)?)),
                ["size", id, n] => Ok(Command::Size(circle(id)?, number(n)?)),
                ["grow", id, steps] => {
                    let steps = steps
                        .parse()
                        .map_err(|_| format!("not a step count: {steps}"))?;
                    Ok(Command::Grow(circle(id)?, steps))
                }
                ["item", index, x, y] => {
                    let index = index
                        .parse()
                        .map_err(|_| format!("not an item index: {index}"))?;
                    Ok(Command::Item(index, number(x)?, number(y)?))
                }
                ["submit"] => Ok(Command::Submit),
                ["next"] => Ok(Command::Next),
                ["leaderboard"] => Ok(Command::Leaderboard),
                ["mute"] => Ok(Command::Mute),
                ["abandon"] => Ok(Command::Abandon),
                ["help"] => Ok(Command::Help),
                ["quit"] | ["exit"] => Ok(Command::Quit),
                _ => Err(format!("unknown command: {}", line.trim())),
            }
        }
    }

    const HELP: &str = "\
commands:
  start <name> <class>     begin a session (class 6-12)
  show                     print the board
  toggle <A|B>             show or hide a circle
  circle <A|B> <x> <y>     move a circle center
  size <A|B> <n>           resize a circle
  grow <A|B> <steps>       resize by slider steps (negative shrinks)
  item <index> <x> <y>     move an item's top-left corner
  submit                   check the placement
  next                     load the next level
  leaderboard              print the leaderboard
  mute                     toggle sound
  abandon                  leave the session
  quit";

    fn render(game: &NativeGame) -> String {
        let state = game.state();
        let mut out = format!("phase: {:?}  score: {}\n", state.phase(), state.score());
        if let Some(level) = state.level() {
            out += &format!(
                "level {}: A = {}, B = {} ({} points)\n",
                level.level_id, level.circle_a_label, level.circle_b_label, level.points
            );
        }
        for circle in state.board().circles() {
            out += &format!(
                "  circle {:?}: {} at ({:.0}, {:.0}) size {:.0}\n",
                circle.id,
                if circle.visible { "shown" } else { "hidden" },
                circle.center.x,
                circle.center.y,
                circle.size
            );
        }
        let zones = state.board().classify_items();
        for (i, (item, (_, zone))) in state.board().items().iter().zip(zones).enumerate() {
            out += &format!(
                "  [{i}] {} at ({:.0}, {:.0}) -> {zone}\n",
                item.text, item.position.x, item.position.y
            );
        }
        if let Some(verdict) = state.verdict() {
            out += &format!(
                "{} (+{} points) {}\n",
                if verdict.correct { "correct" } else { "wrong" },
                verdict.points_added,
                verdict.explanation
            );
        }
        if let Some(err) = state.submit_error() {
            out += &format!("submission failed: {err} (submit again to retry)\n");
        }
        out
    }

    fn render_leaderboard(game: &NativeGame) -> String {
        let board = game.leaderboard();
        let mut out = String::new();
        if board.is_stale() {
            out += "(could not refresh, showing last known entries)\n";
        }
        if board.is_empty() {
            out += "no scores yet\n";
        }
        for e in &board.entries {
            out += &format!(
                "{:>3}. {:<16} class {:>2} {:<7} {:>6} ({} levels)\n",
                e.rank, e.name, e.class_level, e.difficulty, e.score, e.levels_completed
            );
        }
        out
    }

    /// Run one command; returns false to quit
    async fn execute(game: &mut NativeGame, command: Command) -> venn_sort::Result<bool> {
        match command {
            Command::Start { name, class } => {
                game.start(&name, &class).await?;
            }
            Command::Show => {}
            Command::Toggle(id) => {
                game.toggle_circle(id)?;
            }
            Command::Circle(id, x, y) => {
                game.board_mut()?.move_circle(id, glam::Vec2::new(x, y));
            }
            Command::Size(id, size) => {
                game.resize_circle(id, size)?;
            }
            Command::Grow(id, steps) => {
                game.nudge_circle(id, steps)?;
            }
            Command::Item(index, x, y) => {
                let board = game.board_mut()?;
                let id = board
                    .items()
                    .get(index)
                    .map(|item| item.id.clone())
                    .ok_or_else(|| venn_sort::GameError::UnknownItem(index.to_string()))?;
                board.move_item(&id, glam::Vec2::new(x, y))?;
            }
            Command::Submit => {
                game.submit().await?;
            }
            Command::Next => game.advance().await?,
            Command::Leaderboard => {
                game.show_leaderboard().await;
                return Ok(true);
            }
            Command::Mute => {
                let muted = game.toggle_mute();
                log::info!("Sound {}", if muted { "muted" } else { "on" });
            }
            Command::Abandon => game.abandon().await,
            Command::Help => return Ok(true),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    async fn run(mut game: NativeGame) -> std::io::Result<()> {
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        stdout.write_all(format!("{HELP}\n> ").as_bytes()).await?;
        stdout.flush().await?;

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                stdout.write_all(b"> ").await?;
                stdout.flush().await?;
                continue;
            }
            let output = match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(Command::Help) => HELP.to_string(),
                Ok(Command::Leaderboard) => {
                    let _ = execute(&mut game, Command::Leaderboard).await;
                    render_leaderboard(&game)
                }
                Ok(command) => match execute(&mut game, command).await {
                    Ok(_) => render(&game),
                    Err(err) => format!("error: {err}\n{}", render(&game)),
                },
                Err(err) => format!("{err} (try `help`)"),
            };
            stdout.write_all(format!("{}\n> ", output.trim_end()).as_bytes()).await?;
            stdout.flush().await?;
        }

        game.abandon().await;
        game.shutdown();
        Ok(())
    }

    fn build_game(settings: Settings) -> venn_sort::Result<NativeGame> {
        settings.validate()?;
        let api = HttpAuthority::new(&settings)?;
        let sounds = SoundManager::new(NullBackend, settings.audio.clone());
        Ok(Game::new(api, sounds, settings))
    }

    pub fn main() {
        env_logger::init();
        log::info!("Venn Sort (native) starting...");

        let game = match build_game(Settings::load()) {
            Ok(game) => game,
            Err(err) => {
                log::error!("Failed to set up the game: {err}");
                std::process::exit(1);
            }
        };

        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                log::error!("Failed to start runtime: {err}");
                std::process::exit(1);
            }
        };
        if let Err(err) = runtime.block_on(run(game)) {
            log::error!("Terminal I/O failed: {err}");
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_commands() {
            assert_eq!(
                Command::parse("start Ava 8"),
                Ok(Command::Start {
                    name: "Ava".into(),
                    class: "8".into()
                })
            );
            assert_eq!(
                Command::parse("  circle b 10 20.5 "),
                Ok(Command::Circle(CircleId::B, 10.0, 20.5))
            );
            assert_eq!(Command::parse("item 2 0 0"), Ok(Command::Item(2, 0.0, 0.0)));
            assert_eq!(Command::parse("exit"), Ok(Command::Quit));
            assert_eq!(Command::parse("grow a -3"), Ok(Command::Grow(CircleId::A, -3)));
        }

        #[test]
        fn test_parse_start_name_with_spaces() {
            assert_eq!(
                Command::parse("start  Ava   Smith 11"),
                Ok(Command::Start {
                    name: "Ava Smith".into(),
                    class: "11".into()
                })
            );
        }

        #[test]
        fn test_build_game_rejects_invalid_settings() {
            let mut settings = Settings::default();
            settings.class_range.min = 13;
            assert!(matches!(
                build_game(settings),
                Err(venn_sort::GameError::InvalidInput(_))
            ));

            let settings = Settings {
                api_base_url: "  ".into(),
                ..Settings::default()
            };
            assert!(build_game(settings).is_err());
            assert!(build_game(Settings::default()).is_ok());
        }

        #[test]
        fn test_parse_rejects_garbage() {
            assert!(Command::parse("toggle C").is_err());
            assert!(Command::parse("size A big").is_err());
            assert!(Command::parse("start Ava").is_err());
            assert!(Command::parse("start").is_err());
            assert!(Command::parse("grow A 1.5").is_err());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_start in the library
}
