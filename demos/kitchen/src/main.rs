//! Widget showcase: a heading, two editors and a row of buttons in a
//! scrolling list. A scripted headless driver plays the user.

mod script;

use std::rc::Rc;
use std::thread;

use anyhow::anyhow;
use loom_core::{Alignment, Color, Context, Dimensions, Flex, FlexChild, Inset, List, Point, dp};
use loom_material::{Icon, IconError, Theme};
use loom_platform::{Window, run};
use loom_ui::{Button, Editor, EditorEvent, MonospaceShaper};

const LONG_TEXT: &str = "\
1. I learned from my grandfather, Verus, to use good manners, and to
put restraint on anger. 2. In the famous memory of my father I had a
pattern of modesty and manliness. 3. Of my mother I learned to be
pious and generous; to keep myself not only from evil deeds, but even
from evil thoughts; and to live with a simplicity which is far from
customary among the rich. 4. I owe it to my great-grandfather that I
did not attend public lectures and discussions, but had good and able
teachers at home; and I owe him also the knowledge that for things of
this nature a man should count no expense too great.

5. My tutor taught me not to favour either green or blue at the
chariot races, nor, in the contests of gladiators, to be a supporter
either of light or heavy armed. He taught me also to endure labour;
not to need many things; to serve myself without troubling others; not
to intermeddle in the affairs of others, and not easily to listen to
slanders against them.

6. Of Diognetus I had the lesson not to busy myself about vain things;
not to credit the great professions of such as pretend to work
wonders, or of sorcerers about their charms, and their expelling of
Demons and the like; not to keep quails (for fighting or divination),
nor to run after such things; to suffer freedom of speech in others,
and to apply myself heartily to philosophy.";

/// A white plus on transparent.
fn plus_icon() -> Result<Icon, IconError> {
    const N: i32 = 48;
    let bar = |v: i32| (N / 2 - 3..N / 2 + 3).contains(&v);
    let span = |v: i32| (10..N - 10).contains(&v);
    let mut rgba = vec![0u8; (N * N * 4) as usize];
    for y in 0..N {
        for x in 0..N {
            if (bar(x) && span(y)) || (bar(y) && span(x)) {
                let i = ((y * N + x) * 4) as usize;
                rgba[i..i + 4].copy_from_slice(&[0xff; 4]);
            }
        }
    }
    Icon::from_rgba(Point::new(N, N), rgba)
}

struct Kitchen {
    list: List,
    widgets: Widgets,
}

struct Widgets {
    theme: Theme,
    editor: Editor,
    line_editor: Editor,
    button: Button,
    disabled_button: Button,
    icon_button: Button,
    icon: Icon,
    enabled: bool,
    top_label: String,
}

impl Widgets {
    fn new() -> anyhow::Result<Self> {
        let mut editor = Editor::new();
        editor.set_text(LONG_TEXT);
        let mut line_editor = Editor::single_line();
        line_editor.submit = true;
        Ok(Widgets {
            theme: Theme::new(Rc::new(MonospaceShaper::default())),
            editor,
            line_editor,
            button: Button::new(),
            disabled_button: Button::new(),
            icon_button: Button::new(),
            icon: plus_icon()?,
            enabled: false,
            top_label: "Hello, Loom".to_string(),
        })
    }

    fn buttons(&mut self, gtx: &mut Context<'_>) -> Dimensions {
        let Widgets {
            theme,
            button,
            disabled_button,
            icon_button,
            icon,
            enabled,
            ..
        } = self;

        icon_button.update(gtx);
        for _ in 0..icon_button.clicks() {
            log::info!("kitchen: icon button clicked");
        }
        button.update(gtx);
        for _ in 0..button.clicks() {
            *enabled = !*enabled;
        }
        disabled_button.update(gtx);
        if disabled_button.clicks() > 0 {
            log::info!("kitchen: enabled button clicked");
        }
        let enabled = *enabled;

        let inset = Inset::uniform(dp(8.0));
        Flex::row().with_alignment(Alignment::Middle).layout(
            gtx,
            vec![
                FlexChild::rigid(|gtx| {
                    inset.layout(gtx, |gtx| {
                        theme
                            .icon_button(Some(icon.clone()))
                            .layout(gtx, icon_button)
                    })
                }),
                FlexChild::rigid(|gtx| {
                    inset.layout(gtx, |gtx| theme.button("Click me!").layout(gtx, button))
                }),
                FlexChild::rigid(|gtx| {
                    inset.layout(gtx, |gtx| {
                        let mut style =
                            theme.button(if enabled { "Enabled" } else { "Disabled" });
                        style.background = Color::rgb(0x9e9d24);
                        style.enabled = enabled;
                        style.layout(gtx, disabled_button)
                    })
                }),
            ],
        )
    }

    fn item(&mut self, gtx: &mut Context<'_>, i: usize) -> Dimensions {
        match i {
            0 => self.theme.h3(self.top_label.as_str()).layout(gtx),
            1 => {
                let max = gtx.px(dp(200.0));
                gtx.constraints.height.max = gtx.constraints.height.max.min(max);
                gtx.constraints.height.min = gtx.constraints.height.min.min(max);
                self.theme.editor("Hint").layout(gtx, &mut self.editor)
            }
            2 => {
                let dims = self.theme.editor("Hint").layout(gtx, &mut self.line_editor);
                for e in self.line_editor.events() {
                    if let EditorEvent::Submit(s) = e {
                        log::info!("kitchen: submitted {:?}", s.text);
                        self.top_label = s.text;
                    }
                }
                dims
            }
            _ => self.buttons(gtx),
        }
    }
}

impl Kitchen {
    fn new() -> anyhow::Result<Self> {
        Ok(Kitchen {
            list: List::vertical(),
            widgets: Widgets::new()?,
        })
    }

    fn layout(&mut self, gtx: &mut Context<'_>) {
        let widgets = &mut self.widgets;
        self.list.layout(gtx, 4, |gtx, i| {
            Inset::uniform(dp(16.0)).layout(gtx, |gtx| widgets.item(gtx, i))
        });
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let (window, driver) = Window::new();
    let script = thread::Builder::new()
        .name("headless-driver".into())
        .spawn(move || script::play(driver))?;

    let mut kitchen = Kitchen::new()?;
    run(window, |gtx| kitchen.layout(gtx))?;

    script
        .join()
        .map_err(|_| anyhow!("driver thread panicked"))??;
    Ok(())
}
