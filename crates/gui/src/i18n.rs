use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    Ru,
    En,
}

static CURRENT_LANG: AtomicU8 = AtomicU8::new(1); // 1=En (default)

pub fn lang() -> Lang {
    match CURRENT_LANG.load(Ordering::Relaxed) {
        0 => Lang::Ru,
        _ => Lang::En,
    }
}

pub fn set_lang(l: Lang) {
    CURRENT_LANG.store(
        match l {
            Lang::Ru => 0,
            Lang::En => 1,
        },
        Ordering::Relaxed,
    );
}

/// Translate a key to the current language.
pub fn t(key: &str) -> &'static str {
    let ru = lang() == Lang::Ru;
    match key {
        // ── Main menus ──────────────────────────────────────
        "menu.file" => if ru { "Файл" } else { "File" },
        "menu.open_mesh" => if ru { "Открыть сетку..." } else { "Open mesh..." },
        "menu.open_title" => if ru { "Открыть STL" } else { "Open STL" },
        "menu.demo" => if ru { "Демо-дерево" } else { "Demo parts" },
        "menu.clear" => if ru { "Очистить" } else { "Clear parts" },
        "menu.quit" => if ru { "Выход" } else { "Quit" },

        "menu.view" => if ru { "Вид" } else { "View" },
        "menu.tree" => if ru { "Дерево деталей" } else { "Part tree" },
        "menu.properties" => if ru { "Свойства" } else { "Properties" },
        "menu.headset" => if ru { "Зеркало шлема" } else { "Headset mirror" },
        "menu.reset_camera" => if ru { "Сбросить камеру" } else { "Reset camera" },
        "menu.language" => if ru { "Язык" } else { "Language" },

        "menu.vr" => if ru { "VR" } else { "VR" },
        "menu.start_vr" => if ru { "Запустить VR" } else { "Start VR" },
        "menu.stop_vr" => if ru { "Остановить VR" } else { "Stop VR" },

        // ── Part tree ───────────────────────────────────────
        "tree.title" => if ru { "Детали" } else { "Parts" },
        "tree.add" => if ru { "Добавить деталь" } else { "Add part" },
        "tree.add_child" => if ru { "Добавить дочернюю" } else { "Add child part" },
        "tree.new_part" => if ru { "Новая деталь" } else { "New part" },
        "tree.empty" => if ru { "Нет деталей" } else { "No parts" },
        "tree.load" => if ru { "Загрузить сетку..." } else { "Load mesh..." },
        "tree.show" => if ru { "Показать" } else { "Show" },
        "tree.hide" => if ru { "Скрыть" } else { "Hide" },
        "tree.delete" => if ru { "Удалить" } else { "Delete" },

        // ── Properties ──────────────────────────────────────
        "prop.title" => if ru { "Свойства" } else { "Properties" },
        "prop.select" => if ru { "Выберите деталь" } else { "Select a part" },
        "prop.name" => if ru { "Имя" } else { "Name" },
        "prop.visible" => if ru { "Видимость" } else { "Visible" },
        "prop.color" => if ru { "Цвет" } else { "Color" },
        "prop.clip" => if ru { "Отсечение" } else { "Clip" },
        "prop.shrink" => if ru { "Сжатие" } else { "Shrink" },
        "prop.mesh" => if ru { "Сетка" } else { "Mesh" },
        "prop.no_mesh" => if ru { "не загружена" } else { "not loaded" },
        "prop.triangles" => if ru { "треугольников" } else { "triangles" },
        "prop.apply" => if ru { "Применить" } else { "Apply" },
        "prop.revert" => if ru { "Отменить" } else { "Revert" },

        // ── Headset ─────────────────────────────────────────
        "vr.title" => if ru { "Шлем" } else { "Headset" },
        "vr.state" => if ru { "Состояние" } else { "State" },
        "vr.frames" => if ru { "Кадры" } else { "Frames" },
        "vr.rotate" => if ru { "Поворот" } else { "Rotate" },
        "vr.not_running" => if ru { "Цикл рендеринга не запущен" } else { "Render loop not running" },

        // ── Status bar ──────────────────────────────────────
        "status.parts" => if ru { "Детали" } else { "Parts" },
        "status.shown" => if ru { "Показано" } else { "Shown" },
        "status.ready" => if ru { "Готово" } else { "Ready" },

        _ => "???",
    }
}
