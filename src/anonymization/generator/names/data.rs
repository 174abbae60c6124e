//! Embedded name frequency tables
//!
//! Most common given and family names per country. Countries that
//! primarily use a non-Latin script carry the same names in their native
//! script as well as a romanized set.

/// Given and family names for one script
#[derive(Debug)]
pub struct NameSet {
    pub male: &'static [&'static str],
    pub female: &'static [&'static str],
    pub last: &'static [&'static str],
}

impl NameSet {
    pub fn is_first_name(&self, fragment: &str) -> bool {
        contains_ignore_case(self.male, fragment) || contains_ignore_case(self.female, fragment)
    }

    pub fn is_last_name(&self, fragment: &str) -> bool {
        contains_ignore_case(self.last, fragment)
    }
}

fn contains_ignore_case(names: &[&str], fragment: &str) -> bool {
    names.iter().any(|n| {
        n.chars()
            .flat_map(char::to_lowercase)
            .eq(fragment.chars().flat_map(char::to_lowercase))
    })
}

/// Name tables for one country (ISO 3166-1 alpha-2)
#[derive(Debug)]
pub struct CountryNames {
    pub country: &'static str,
    pub latin: NameSet,
    pub native: Option<NameSet>,
}

pub static COUNTRIES: &[CountryNames] = &[
    CountryNames {
        country: "US",
        latin: NameSet {
            male: &["James", "Robert", "John", "Michael", "David", "William", "Richard", "Joseph", "Thomas", "Christopher"],
            female: &["Mary", "Patricia", "Jennifer", "Linda", "Elizabeth", "Barbara", "Susan", "Jessica", "Sarah", "Karen"],
            last: &["Smith", "Johnson", "Williams", "Brown", "Jones", "Miller", "Davis", "Wilson", "Anderson", "Taylor"],
        },
        native: None,
    },
    CountryNames {
        country: "GB",
        latin: NameSet {
            male: &["Oliver", "George", "Harry", "Jack", "Charlie", "Thomas", "Oscar", "Alfie", "Henry", "Archie"],
            female: &["Olivia", "Amelia", "Isla", "Ava", "Emily", "Sophie", "Grace", "Lily", "Freya", "Poppy"],
            last: &["Evans", "Thomas", "Roberts", "Walker", "Wright", "Robinson", "Thompson", "Hughes", "Edwards", "Green"],
        },
        native: None,
    },
    CountryNames {
        country: "FR",
        latin: NameSet {
            male: &["Jean", "Pierre", "Michel", "Philippe", "Alain", "Nicolas", "Julien", "Mathieu", "Antoine", "Sébastien"],
            female: &["Marie", "Nathalie", "Isabelle", "Sylvie", "Catherine", "Camille", "Chloé", "Manon", "Élodie", "Céline"],
            last: &["Martin", "Bernard", "Dubois", "Durand", "Lefebvre", "Moreau", "Laurent", "Girard", "Lefèvre", "Fournier"],
        },
        native: None,
    },
    CountryNames {
        country: "DE",
        latin: NameSet {
            male: &["Lukas", "Jonas", "Felix", "Maximilian", "Leon", "Paul", "Jürgen", "Klaus", "Stefan", "Wolfgang"],
            female: &["Anna", "Lena", "Leonie", "Hannah", "Ursula", "Sabine", "Petra", "Monika", "Katharina", "Jana"],
            last: &["Müller", "Schmidt", "Schneider", "Fischer", "Weber", "Meyer", "Wagner", "Becker", "Schulz", "Hoffmann"],
        },
        native: None,
    },
    CountryNames {
        country: "ES",
        latin: NameSet {
            male: &["Antonio", "Manuel", "José", "Francisco", "Javier", "Alejandro", "Pablo", "Sergio", "Álvaro", "Diego"],
            female: &["Lucía", "Carmen", "Dolores", "Isabel", "Laura", "Pilar", "Cristina", "Marta", "Elena", "Rocío"],
            last: &["García", "Fernández", "González", "Rodríguez", "López", "Martínez", "Sánchez", "Pérez", "Gómez", "Ruiz"],
        },
        native: None,
    },
    CountryNames {
        country: "IT",
        latin: NameSet {
            male: &["Giuseppe", "Giovanni", "Marco", "Luca", "Alessandro", "Francesco", "Matteo", "Lorenzo", "Andrea", "Davide"],
            female: &["Giulia", "Chiara", "Francesca", "Federica", "Sofia", "Alessia", "Martina", "Valentina", "Giorgia", "Silvia"],
            last: &["Rossi", "Russo", "Ferrari", "Esposito", "Bianchi", "Romano", "Colombo", "Ricci", "Marino", "Greco"],
        },
        native: None,
    },
    CountryNames {
        country: "NL",
        latin: NameSet {
            male: &["Daan", "Sem", "Bram", "Lars", "Thijs", "Jeroen", "Sander", "Joost", "Pieter", "Wouter"],
            female: &["Emma", "Julia", "Tess", "Sanne", "Fleur", "Anouk", "Lotte", "Femke", "Ilse", "Marieke"],
            last: &["de Jong", "Jansen", "de Vries", "van den Berg", "van Dijk", "Bakker", "Janssen", "Visser", "Smit", "Meijer"],
        },
        native: None,
    },
    CountryNames {
        country: "PL",
        latin: NameSet {
            male: &["Piotr", "Krzysztof", "Andrzej", "Tomasz", "Paweł", "Michał", "Marcin", "Grzegorz", "Jakub", "Łukasz"],
            female: &["Agnieszka", "Katarzyna", "Małgorzata", "Joanna", "Magdalena", "Monika", "Ewa", "Zofia", "Barbara", "Dorota"],
            last: &["Nowak", "Kowalski", "Wiśniewski", "Wójcik", "Kowalczyk", "Kamiński", "Lewandowski", "Zieliński", "Szymański", "Woźniak"],
        },
        native: None,
    },
    CountryNames {
        country: "BR",
        latin: NameSet {
            male: &["João", "Pedro", "Lucas", "Gabriel", "Rafael", "Gustavo", "Thiago", "Bruno", "Leonardo", "Rodrigo"],
            female: &["Ana", "Beatriz", "Larissa", "Juliana", "Fernanda", "Mariana", "Camila", "Letícia", "Gabriela", "Luana"],
            last: &["Silva", "Santos", "Oliveira", "Souza", "Lima", "Pereira", "Ferreira", "Alves", "Costa", "Ribeiro"],
        },
        native: None,
    },
    CountryNames {
        country: "TR",
        latin: NameSet {
            male: &["Mehmet", "Mustafa", "Ahmet", "Ali", "Hüseyin", "Hasan", "İbrahim", "Emre", "Murat", "Burak"],
            female: &["Fatma", "Ayşe", "Emine", "Hatice", "Zeynep", "Elif", "Meryem", "Şerife", "Sultan", "Merve"],
            last: &["Yılmaz", "Kaya", "Demir", "Şahin", "Çelik", "Yıldız", "Yıldırım", "Öztürk", "Aydın", "Özdemir"],
        },
        native: None,
    },
    CountryNames {
        country: "CN",
        latin: NameSet {
            male: &["Wei", "Jun", "Lei", "Qiang", "Tao", "Ming", "Chao", "Hao", "Jian", "Bo"],
            female: &["Fang", "Na", "Min", "Jing", "Li", "Yan", "Xiu", "Juan", "Ying", "Hui"],
            last: &["Wang", "Li", "Zhang", "Liu", "Chen", "Yang", "Huang", "Zhao", "Wu", "Zhou"],
        },
        native: Some(NameSet {
            male: &["伟", "军", "磊", "强", "涛", "明", "超", "浩", "建", "波"],
            female: &["芳", "娜", "敏", "静", "丽", "艳", "秀英", "娟", "颖", "慧"],
            last: &["王", "李", "张", "刘", "陈", "杨", "黄", "赵", "吴", "周"],
        }),
    },
    CountryNames {
        country: "TW",
        latin: NameSet {
            male: &["Chia-hao", "Chih-ming", "Chun-chieh", "Tsung-han", "Yu-hsiang", "Chien-hung", "Wen-hsiung", "Cheng-en"],
            female: &["Shu-fen", "Mei-ling", "Ya-ting", "Yi-chun", "Hui-ju", "Shu-hui", "Pei-shan", "Hsin-yi"],
            last: &["Chen", "Lin", "Huang", "Chang", "Lee", "Wang", "Wu", "Tsai", "Yang", "Hsu"],
        },
        native: Some(NameSet {
            male: &["家豪", "志明", "俊傑", "宗翰", "宇翔", "建宏", "文雄", "承恩"],
            female: &["淑芬", "美玲", "雅婷", "怡君", "惠如", "淑惠", "佩珊", "欣怡"],
            last: &["陳", "林", "黃", "張", "李", "王", "吳", "蔡", "楊", "許"],
        }),
    },
    CountryNames {
        country: "JP",
        latin: NameSet {
            male: &["Hiroshi", "Takashi", "Kenji", "Daiki", "Haruto", "Yuto", "Sota", "Ren", "Kazuki", "Takumi"],
            female: &["Yuki", "Yoko", "Keiko", "Haruka", "Sakura", "Yui", "Aoi", "Hina", "Misaki", "Naomi"],
            last: &["Sato", "Suzuki", "Takahashi", "Tanaka", "Watanabe", "Ito", "Yamamoto", "Nakamura", "Kobayashi", "Kato"],
        },
        native: Some(NameSet {
            male: &["博", "隆", "健二", "大輝", "陽翔", "悠斗", "蒼太", "蓮", "和樹", "拓海"],
            female: &["由紀", "洋子", "恵子", "遥", "さくら", "結衣", "葵", "陽菜", "美咲", "直美"],
            last: &["佐藤", "鈴木", "高橋", "田中", "渡辺", "伊藤", "山本", "中村", "小林", "加藤"],
        }),
    },
    CountryNames {
        country: "KR",
        latin: NameSet {
            male: &["Min-jun", "Seo-jun", "Ji-hoon", "Hyun-woo", "Jun-seo", "Dong-hyun", "Sung-min", "Jae-won"],
            female: &["Seo-yeon", "Ji-woo", "Min-seo", "Ha-eun", "Soo-jin", "Eun-ji", "Ji-yeon", "Hye-jin"],
            last: &["Kim", "Lee", "Park", "Choi", "Jung", "Kang", "Cho", "Yoon", "Jang", "Lim"],
        },
        native: Some(NameSet {
            male: &["민준", "서준", "지훈", "현우", "준서", "동현", "성민", "재원"],
            female: &["서연", "지우", "민서", "하은", "수진", "은지", "지연", "혜진"],
            last: &["김", "이", "박", "최", "정", "강", "조", "윤", "장", "임"],
        }),
    },
    CountryNames {
        country: "RU",
        latin: NameSet {
            male: &["Alexander", "Sergei", "Dmitri", "Andrei", "Alexei", "Maxim", "Ivan", "Mikhail", "Nikolai", "Vladimir"],
            female: &["Elena", "Olga", "Natalia", "Tatiana", "Irina", "Svetlana", "Anastasia", "Ekaterina", "Yulia", "Maria"],
            last: &["Ivanov", "Smirnov", "Kuznetsov", "Popov", "Vasiliev", "Petrov", "Sokolov", "Mikhailov", "Novikov", "Fedorov"],
        },
        native: Some(NameSet {
            male: &["Александр", "Сергей", "Дмитрий", "Андрей", "Алексей", "Максим", "Иван", "Михаил", "Николай", "Владимир"],
            female: &["Елена", "Ольга", "Наталья", "Татьяна", "Ирина", "Светлана", "Анастасия", "Екатерина", "Юлия", "Мария"],
            last: &["Иванов", "Смирнов", "Кузнецов", "Попов", "Васильев", "Петров", "Соколов", "Михайлов", "Новиков", "Фёдоров"],
        }),
    },
    CountryNames {
        country: "IN",
        latin: NameSet {
            male: &["Rahul", "Amit", "Rajesh", "Suresh", "Vijay", "Arjun", "Sanjay", "Anil", "Ravi", "Deepak"],
            female: &["Priya", "Anjali", "Sunita", "Pooja", "Kavita", "Neha", "Lakshmi", "Divya", "Meera", "Asha"],
            last: &["Sharma", "Kumar", "Singh", "Patel", "Gupta", "Reddy", "Iyer", "Nair", "Das", "Joshi"],
        },
        native: Some(NameSet {
            male: &["राहुल", "अमित", "राजेश", "सुरेश", "विजय", "अर्जुन", "संजय", "अनिल", "रवि", "दीपक"],
            female: &["प्रिया", "अंजलि", "सुनीता", "पूजा", "कविता", "नेहा", "लक्ष्मी", "दिव्या", "मीरा", "आशा"],
            last: &["शर्मा", "कुमार", "सिंह", "पटेल", "गुप्ता", "रेड्डी", "अय्यर", "नायर", "दास", "जोशी"],
        }),
    },
    CountryNames {
        country: "SA",
        latin: NameSet {
            male: &["Mohammed", "Abdullah", "Ahmed", "Khalid", "Faisal", "Omar", "Saud", "Fahad", "Sultan", "Nasser"],
            female: &["Fatimah", "Noura", "Sara", "Reem", "Aisha", "Maha", "Lama", "Hessa", "Amal", "Layla"],
            last: &["Al-Otaibi", "Al-Qahtani", "Al-Ghamdi", "Al-Harbi", "Al-Zahrani", "Al-Shehri", "Al-Dosari", "Al-Mutairi"],
        },
        native: Some(NameSet {
            male: &["محمد", "عبدالله", "أحمد", "خالد", "فيصل", "عمر", "سعود", "فهد", "سلطان", "ناصر"],
            female: &["فاطمة", "نورة", "سارة", "ريم", "عائشة", "مها", "لمى", "حصة", "أمل", "ليلى"],
            last: &["العتيبي", "القحطاني", "الغامدي", "الحربي", "الزهراني", "الشهري", "الدوسري", "المطيري"],
        }),
    },
];

/// Every given name in the tables, Latin and native
pub fn all_first_names() -> impl Iterator<Item = &'static str> {
    COUNTRIES.iter().flat_map(|c| {
        let native: &[&'static str] = c.native.as_ref().map_or(&[][..], |n| n.male);
        let native_female: &[&'static str] = c.native.as_ref().map_or(&[][..], |n| n.female);
        c.latin
            .male
            .iter()
            .chain(c.latin.female.iter())
            .chain(native.iter())
            .chain(native_female.iter())
            .copied()
    })
}
